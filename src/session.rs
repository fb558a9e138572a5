//! Explicit state machine for one operator session. The interaction loop
//! feeds events in; every decision about what comes next lives here, not
//! in the I/O layer.
use crate::model::{ExtractedLabel, FlowError, MatchOutcome, RowMatch};

#[derive(Debug, Clone)]
pub enum SessionState {
    SelectingStore,
    AwaitingScan {
        store_id: String,
    },
    /// Scanned fields shown to the operator. `outcome` is `None` until the
    /// lookup for the current field values has run.
    Verifying {
        store_id: String,
        label: ExtractedLabel,
        outcome: Option<MatchOutcome>,
    },
    Updating {
        store_id: String,
        label: ExtractedLabel,
        target: RowMatch,
    },
    Creating {
        store_id: String,
        label: ExtractedLabel,
        /// True when matching rows existed and the operator forced a
        /// duplicate anyway.
        had_matches: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelField {
    Manufacturer,
    Reference,
    Name,
    Details,
    Qty,
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    StoreSelected(String),
    StoreClosed,
    ScanCaptured(ExtractedLabel),
    MatchesComputed(MatchOutcome),
    FieldEdited(LabelField, String),
    TargetSelected(RowMatch),
    CreateRequested,
    Saved,
    Cancelled,
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::SelectingStore => "SelectingStore",
            SessionState::AwaitingScan { .. } => "AwaitingScan",
            SessionState::Verifying { .. } => "Verifying",
            SessionState::Updating { .. } => "Updating",
            SessionState::Creating { .. } => "Creating",
        }
    }
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::StoreSelected(_) => "StoreSelected",
            SessionEvent::StoreClosed => "StoreClosed",
            SessionEvent::ScanCaptured(_) => "ScanCaptured",
            SessionEvent::MatchesComputed(_) => "MatchesComputed",
            SessionEvent::FieldEdited(_, _) => "FieldEdited",
            SessionEvent::TargetSelected(_) => "TargetSelected",
            SessionEvent::CreateRequested => "CreateRequested",
            SessionEvent::Saved => "Saved",
            SessionEvent::Cancelled => "Cancelled",
        }
    }
}

pub struct Session {
    state: SessionState,
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::SelectingStore,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Applies one event. Invalid (state, event) pairs leave the state
    /// untouched and report an error instead of panicking.
    pub fn apply(&mut self, event: SessionEvent) -> Result<(), FlowError> {
        let state = std::mem::replace(&mut self.state, SessionState::SelectingStore);
        match Self::transition(state, event) {
            Ok(next) => {
                self.state = next;
                Ok(())
            }
            Err((state, err)) => {
                self.state = state;
                Err(err)
            }
        }
    }

    fn transition(
        state: SessionState,
        event: SessionEvent,
    ) -> Result<SessionState, (SessionState, FlowError)> {
        use SessionEvent::*;
        use SessionState::*;

        // Closing the store is allowed from anywhere.
        if matches!(event, StoreClosed) {
            return Ok(SelectingStore);
        }

        match (state, event) {
            (SelectingStore, StoreSelected(store_id)) => Ok(AwaitingScan { store_id }),

            (AwaitingScan { store_id }, ScanCaptured(label)) => Ok(Verifying {
                store_id,
                label,
                outcome: None,
            }),

            (Verifying { store_id, label, .. }, MatchesComputed(outcome)) => Ok(Verifying {
                store_id,
                label,
                outcome: Some(outcome),
            }),

            // Editing a key field invalidates the lookup; the caller must
            // recompute matches before proceeding. Other fields keep the
            // current outcome.
            (Verifying { store_id, label, outcome }, FieldEdited(field, value)) => {
                match Self::edit(label, outcome, field, value) {
                    Ok((label, outcome)) => Ok(Verifying { store_id, label, outcome }),
                    Err((label, outcome, err)) => {
                        Err((Verifying { store_id, label, outcome }, err))
                    }
                }
            }

            (Creating { store_id, label, had_matches }, FieldEdited(field, value)) => {
                match Self::edit(label, None, field, value) {
                    Ok((label, _)) => Ok(Creating { store_id, label, had_matches }),
                    Err((label, _, err)) => Err((Creating { store_id, label, had_matches }, err)),
                }
            }

            (
                Verifying {
                    store_id,
                    label,
                    outcome: Some(outcome),
                },
                TargetSelected(target),
            ) => {
                if outcome.rows().iter().any(|m| m.row == target.row) {
                    Ok(Updating { store_id, label, target })
                } else {
                    Err((
                        Verifying {
                            store_id,
                            label,
                            outcome: Some(outcome),
                        },
                        FlowError::InvalidTransition {
                            state: "Verifying",
                            event: "TargetSelected",
                        },
                    ))
                }
            }

            (
                Verifying {
                    store_id,
                    label,
                    outcome: Some(outcome),
                },
                CreateRequested,
            ) => Ok(Creating {
                store_id,
                label,
                had_matches: !outcome.rows().is_empty(),
            }),

            (Updating { store_id, .. } | Creating { store_id, .. }, Saved | Cancelled) => {
                Ok(AwaitingScan { store_id })
            }

            (Verifying { store_id, .. }, Cancelled) => Ok(AwaitingScan { store_id }),

            (state, event) => {
                let err = FlowError::InvalidTransition {
                    state: state.name(),
                    event: event.name(),
                };
                Err((state, err))
            }
        }
    }

    #[allow(clippy::type_complexity)]
    fn edit(
        mut label: ExtractedLabel,
        outcome: Option<MatchOutcome>,
        field: LabelField,
        value: String,
    ) -> Result<(ExtractedLabel, Option<MatchOutcome>), (ExtractedLabel, Option<MatchOutcome>, FlowError)>
    {
        match field {
            LabelField::Manufacturer => {
                label.manufacturer = value;
                Ok((label, None))
            }
            LabelField::Reference => {
                label.reference = value;
                Ok((label, None))
            }
            LabelField::Name => {
                label.name = value;
                Ok((label, outcome))
            }
            LabelField::Details => {
                label.details = value;
                Ok((label, outcome))
            }
            LabelField::Qty => match value.trim().parse() {
                Ok(qty) => {
                    label.qty = qty;
                    Ok((label, outcome))
                }
                Err(_) => Err((label, outcome, FlowError::InvalidQuantity(value))),
            },
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
