//! Test units: named thunks with setup kept out of the measured region.

use std::fmt;

/// A named unit of work whose steady-state execution cost gets measured.
///
/// The thunk is the *steady-state* part only: anything that should run
/// once (building inputs, opening files, warming a data structure) is
/// captured into the closure before construction so its cost never lands
/// inside a measured batch.
pub struct TestUnit {
    name: String,
    thunk: Box<dyn FnMut()>,
}

impl TestUnit {
    /// Wrap a steady-state thunk under a name.
    ///
    /// ```ignore
    /// let input: Vec<u64> = (0..1000).collect(); // setup, unmeasured
    /// let unit = TestUnit::new("sum 1000", move || {
    ///     percall::black_box(input.iter().sum::<u64>());
    /// });
    /// ```
    pub fn new(name: impl Into<String>, thunk: impl FnMut() + 'static) -> Self {
        Self {
            name: name.into(),
            thunk: Box::new(thunk),
        }
    }

    /// Expand one name over an ordered argument list into one unit per
    /// value, named `"{name} {arg}"`.
    ///
    /// The factory is a thunk factory in the strict sense: it receives the
    /// argument, performs any parameter-dependent setup (e.g. building an
    /// input of that size), and returns the deferred steady-state thunk.
    /// The factory runs exactly once per argument, before any sampling.
    pub fn indexed<P, A, F>(name: &str, args: A, factory: F) -> Vec<TestUnit>
    where
        P: fmt::Display,
        A: IntoIterator<Item = P>,
        F: Fn(P) -> Box<dyn FnMut()>,
    {
        args.into_iter()
            .map(|arg| {
                let unit_name = format!("{} {}", name, arg);
                TestUnit {
                    name: unit_name,
                    thunk: factory(arg),
                }
            })
            .collect()
    }

    /// Name of this unit as it appears in reports.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execute the steady-state thunk once.
    #[inline]
    pub(crate) fn run(&mut self) {
        (self.thunk)()
    }
}

impl fmt::Debug for TestUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestUnit").field("name", &self.name).finish()
    }
}
