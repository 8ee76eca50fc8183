//! Field state machine.
//!
//! ```text
//!            validate            validate
//! Unknown ───────────► Valid ◄───────────► Invalid
//!    ▲                   │                    │
//!    └────── reset ──────┴────── reset ───────┘
//! ```
//!
//! `touched` and `changed` only ever go from false to true until the next
//! reset.

use std::fmt;
use std::sync::{Arc, RwLock};

use crate::rules::Rules;
use crate::scheduler::DebounceSlot;
use crate::value::FieldValue;

/// Tri-state validity of a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Validity {
    /// Never validated since registration or the last reset.
    #[default]
    Unknown,
    Valid,
    Invalid,
}

impl Validity {
    pub fn is_valid(self) -> bool {
        self == Validity::Valid
    }

    pub fn is_invalid(self) -> bool {
        self == Validity::Invalid
    }

    pub fn is_unknown(self) -> bool {
        self == Validity::Unknown
    }
}

impl From<bool> for Validity {
    fn from(valid: bool) -> Self {
        if valid {
            Validity::Valid
        } else {
            Validity::Invalid
        }
    }
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validity::Unknown => f.write_str("unknown"),
            Validity::Valid => f.write_str("valid"),
            Validity::Invalid => f.write_str("invalid"),
        }
    }
}

/// Snapshot of a field's mutable state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldState {
    pub value: FieldValue,
    pub valid: Validity,
    pub changed: bool,
    pub touched: bool,
    pub validated: bool,
}

struct FieldShared {
    id: String,
    rules: Rules,
    required: bool,
    state: RwLock<FieldState>,
    debounce: DebounceSlot,
}

/// Handle to a registered field.
///
/// Cheap to clone; clones refer to the same field. Inputs keep the handle
/// returned by registration to render their own validity.
#[derive(Clone)]
pub struct Field {
    shared: Arc<FieldShared>,
}

impl Field {
    pub(crate) fn new(id: impl Into<String>, rules: Rules, value: FieldValue) -> Self {
        let required = rules.is_required();
        Self {
            shared: Arc::new(FieldShared {
                id: id.into(),
                rules,
                required,
                state: RwLock::new(FieldState {
                    value,
                    ..Default::default()
                }),
                debounce: DebounceSlot::new(),
            }),
        }
    }

    /// Id the field was registered under.
    pub fn id(&self) -> &str {
        &self.shared.id
    }

    pub fn rules(&self) -> &Rules {
        &self.shared.rules
    }

    /// Fixed at registration.
    pub fn is_required(&self) -> bool {
        self.shared.required
    }

    // -------------------------------------------------------------------------
    // Read methods
    // -------------------------------------------------------------------------

    /// Last observed value.
    pub fn value(&self) -> FieldValue {
        self.read(|s| s.value.clone())
    }

    pub fn validity(&self) -> Validity {
        self.read(|s| s.valid)
    }

    pub fn is_changed(&self) -> bool {
        self.read(|s| s.changed)
    }

    pub fn is_touched(&self) -> bool {
        self.read(|s| s.touched)
    }

    pub fn is_validated(&self) -> bool {
        self.read(|s| s.validated)
    }

    /// Copy of the whole mutable state.
    pub fn state(&self) -> FieldState {
        self.read(FieldState::clone)
    }

    // -------------------------------------------------------------------------
    // Write methods
    // -------------------------------------------------------------------------

    /// Mark the field as touched. Does not validate.
    pub fn touch(&self) {
        self.write(|s| s.touched = true);
    }

    /// Return validity and flags to their initial state. Keeps the value.
    pub fn reset(&self) {
        self.write(|s| {
            s.valid = Validity::Unknown;
            s.changed = false;
            s.touched = false;
            s.validated = false;
        });
    }

    pub(crate) fn set_value(&self, value: FieldValue) {
        self.write(|s| s.value = value);
    }

    /// Store the outcome of a validation pass.
    pub(crate) fn record(&self, valid: bool) {
        self.write(|s| {
            s.valid = Validity::from(valid);
            s.changed = true;
            s.validated = true;
        });
    }

    pub(crate) fn debounce_slot(&self) -> &DebounceSlot {
        &self.shared.debounce
    }

    fn read<R>(&self, f: impl FnOnce(&FieldState) -> R) -> R {
        match self.shared.state.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    fn write(&self, f: impl FnOnce(&mut FieldState)) {
        match self.shared.state.write() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("id", &self.shared.id)
            .field("required", &self.shared.required)
            .field("state", &self.state())
            .finish()
    }
}
