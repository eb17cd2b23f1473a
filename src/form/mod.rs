mod controller;
mod model;
mod values;


pub use controller::{
    FieldMeta, FormController, FormError, FormId, FormOptions, FormPhase, FormResult,
    FormSnapshot, RevalidateMode, SubmitGuard, SubmitOutcome, SubscriptionId,
};
pub use loginform_derive::FormModel;
pub use model::{FieldLens, FormModel};
pub use values::{FieldKey, FieldValues};
