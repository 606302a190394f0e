//! Type-erased, type-safe measurement registry.
//!
//! The registry lets the sampling loop hold arbitrary instruments, a
//! clock reading `f64` seconds next to a counter reading `u64` events,
//! in one collection without knowing their concrete types. Registration
//! records an instrument *kind* in an append-only catalog keyed by a
//! stable identity string; instantiation builds a runtime instrument and
//! hands back an opaque [`Witness`] used for every subsequent operation.
//!
//! Type safety is preserved end to end: [`Registry::sample`] yields a
//! generic [`Value`], while [`Registry::sample_exact`] projects the
//! reading back to the exact type the instrument was registered with and
//! fails safely on mismatch. The registry never coerces silently.
//!
//! The registry is an explicitly passed object rather than process-global
//! state, so independent benchmarking sessions in one process cannot
//! cross-contaminate and tests can construct throwaway registries freely.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::instrument::{CounterValue, ErasedInstrument, Instrument, ResourceError, Value};

/// Process-wide counter handing each registry a distinct identity, so
/// handles from one registry can never resolve inside another.
static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(0);

/// Identifier for a registered instrument kind, reusable across runs.
///
/// Bound to the registry that issued it; a foreign registry rejects it
/// with [`RegistryError::UnknownMeasure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeasureId {
    registry: u64,
    index: usize,
}

/// Opaque, comparable handle bound to exactly one instantiated instrument.
///
/// Carries no visible type information; all lookups and readings go
/// through the registry that issued it. Using a witness against a
/// different registry is a contract violation and panics (a logic bug,
/// not a runtime condition to recover from), even when the foreign
/// registry happens to have a slot at the same position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Witness {
    registry: u64,
    index: usize,
}

/// Errors raised by registry operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// `instantiate` was called with a measure id this registry never issued.
    UnknownMeasure(MeasureId),
    /// `sample_exact` requested a reading type different from the one the
    /// instrument was registered with.
    ReadingTypeMismatch {
        /// Label of the instrument whose reading was requested.
        label: String,
        /// Type name of the instrument's actual reading.
        actual: &'static str,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::UnknownMeasure(id) => {
                write!(f, "unknown measure id {:?}", id)
            }
            RegistryError::ReadingTypeMismatch { label, actual } => {
                write!(
                    f,
                    "instrument '{}' reads {}, requested a different type",
                    label, actual
                )
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// A catalog entry: stable key plus a factory for runtime instruments.
struct Kind {
    key: String,
    build: Box<dyn Fn() -> Box<dyn ErasedInstrument>>,
    reading_type: TypeId,
}

/// An instantiated instrument slot.
struct Slot {
    instrument: Box<dyn ErasedInstrument>,
    reading_type: TypeId,
    loaded: bool,
}

/// Append-only table of instrument kinds and their runtime instances.
pub struct Registry {
    id: u64,
    kinds: Vec<Kind>,
    by_key: HashMap<String, MeasureId>,
    slots: Vec<Slot>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create an empty registry for one benchmarking session.
    pub fn new() -> Self {
        Self {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            kinds: Vec::new(),
            by_key: HashMap::new(),
            slots: Vec::new(),
        }
    }

    /// Record an instrument kind keyed by a stable identity string.
    ///
    /// Idempotent per key: registering the same key twice returns the
    /// original [`MeasureId`] without extending the catalog. The builder
    /// runs once per [`instantiate`](Registry::instantiate) call.
    pub fn register<I, F>(&mut self, key: impl Into<String>, build: F) -> MeasureId
    where
        I: Instrument + 'static,
        F: Fn() -> I + 'static,
    {
        let key = key.into();
        if let Some(id) = self.by_key.get(&key) {
            return *id;
        }

        let id = MeasureId {
            registry: self.id,
            index: self.kinds.len(),
        };
        self.kinds.push(Kind {
            key: key.clone(),
            build: Box::new(move || Box::new(build())),
            reading_type: TypeId::of::<I::Reading>(),
        });
        self.by_key.insert(key, id);
        id
    }

    /// Number of distinct registered kinds.
    pub fn catalog_len(&self) -> usize {
        self.kinds.len()
    }

    /// Stable key of a registered kind.
    pub fn key(&self, id: MeasureId) -> Result<&str, RegistryError> {
        if id.registry != self.id {
            return Err(RegistryError::UnknownMeasure(id));
        }
        self.kinds
            .get(id.index)
            .map(|kind| kind.key.as_str())
            .ok_or(RegistryError::UnknownMeasure(id))
    }

    /// Create a runtime instrument bound to a fresh witness.
    ///
    /// Rejects measure ids issued by any other registry, including ids
    /// whose index would happen to resolve here.
    pub fn instantiate(&mut self, id: MeasureId) -> Result<Witness, RegistryError> {
        if id.registry != self.id {
            return Err(RegistryError::UnknownMeasure(id));
        }
        let kind = self
            .kinds
            .get(id.index)
            .ok_or(RegistryError::UnknownMeasure(id))?;

        let witness = Witness {
            registry: self.id,
            index: self.slots.len(),
        };
        self.slots.push(Slot {
            instrument: (kind.build)(),
            reading_type: kind.reading_type,
            loaded: false,
        });
        Ok(witness)
    }

    /// Stable label of the witnessed instrument.
    pub fn label(&self, witness: Witness) -> &str {
        self.slot(witness).instrument.label()
    }

    /// Physical unit of the witnessed instrument's readings.
    pub fn unit(&self, witness: Witness) -> &str {
        self.slot(witness).instrument.unit()
    }

    /// Acquire the witnessed instrument's observation resources.
    ///
    /// On failure the instrument stays unloaded; calling
    /// [`unload`](Registry::unload) afterwards is still safe.
    pub fn load(&mut self, witness: Witness) -> Result<(), ResourceError> {
        let slot = self.slot_mut(witness);
        slot.instrument.load()?;
        slot.loaded = true;
        Ok(())
    }

    /// Release the witnessed instrument's resources. Idempotent: safe to
    /// call after a failed `load` or repeatedly.
    pub fn unload(&mut self, witness: Witness) {
        let slot = self.slot_mut(witness);
        slot.instrument.unload();
        slot.loaded = false;
    }

    /// Whether the witnessed instrument is currently loaded.
    pub fn is_loaded(&self, witness: Witness) -> bool {
        self.slot(witness).loaded
    }

    /// Read the current counter value as a generic [`Value`].
    pub fn sample(&mut self, witness: Witness) -> Value {
        self.slot_mut(witness).instrument.sample_value()
    }

    /// Read the current counter value at its exact registered type.
    ///
    /// This is the safe projection out of the open union: the requested
    /// type is checked against the type recorded at registration, and a
    /// mismatch is an error rather than a coerced or truncated value.
    pub fn sample_exact<R: CounterValue>(
        &mut self,
        witness: Witness,
    ) -> Result<R, RegistryError> {
        let slot = self.slot_mut(witness);
        if slot.reading_type != TypeId::of::<R>() {
            return Err(RegistryError::ReadingTypeMismatch {
                label: slot.instrument.label().to_string(),
                actual: slot.instrument.reading_type_name(),
            });
        }
        let boxed = slot.instrument.sample_boxed();
        match boxed.downcast::<R>() {
            Ok(reading) => Ok(*reading),
            // reading_type was checked above; sample_boxed always boxes
            // I::Reading, so this arm is unreachable for a well-formed slot.
            Err(_) => Err(RegistryError::ReadingTypeMismatch {
                label: self.slot(witness).instrument.label().to_string(),
                actual: self.slot(witness).instrument.reading_type_name(),
            }),
        }
    }

    fn slot(&self, witness: Witness) -> &Slot {
        if witness.registry != self.id {
            panic!("witness {:?} was not issued by this registry", witness);
        }
        self.slots
            .get(witness.index)
            .unwrap_or_else(|| panic!("witness {:?} was not issued by this registry", witness))
    }

    fn slot_mut(&mut self, witness: Witness) -> &mut Slot {
        if witness.registry != self.id {
            panic!("witness {:?} was not issued by this registry", witness);
        }
        self.slots
            .get_mut(witness.index)
            .unwrap_or_else(|| panic!("witness {:?} was not issued by this registry", witness))
    }
}

/// RAII guard over a set of loaded witnesses.
///
/// Unloads every witness it managed to load when dropped, so the sampling
/// loop cannot leak instrument resources on any exit path, including
/// panics inside the unit under test.
pub(crate) struct Loaded<'a> {
    registry: &'a mut Registry,
    witnesses: Vec<Witness>,
}

impl fmt::Debug for Loaded<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loaded")
            .field("witnesses", &self.witnesses)
            .finish_non_exhaustive()
    }
}

impl<'a> Loaded<'a> {
    /// Load every witness in order.
    ///
    /// On the first failure, everything loaded so far is unloaded and the
    /// failing instrument's [`ResourceError`] is returned.
    pub(crate) fn acquire(
        registry: &'a mut Registry,
        witnesses: &[Witness],
    ) -> Result<Self, ResourceError> {
        let mut loaded = Vec::with_capacity(witnesses.len());
        for &witness in witnesses {
            match registry.load(witness) {
                Ok(()) => loaded.push(witness),
                Err(err) => {
                    for &prior in loaded.iter().rev() {
                        registry.unload(prior);
                    }
                    // The failing instrument may have partially acquired
                    // resources; unload is idempotent-safe by contract.
                    registry.unload(witness);
                    return Err(err);
                }
            }
        }
        Ok(Self {
            registry,
            witnesses: loaded,
        })
    }

    pub(crate) fn registry(&mut self) -> &mut Registry {
        self.registry
    }
}

impl Drop for Loaded<'_> {
    fn drop(&mut self) {
        for &witness in self.witnesses.iter().rev() {
            self.registry.unload(witness);
        }
    }
}
