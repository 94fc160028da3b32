// ── Domain views ──
//
// Typed projections of controller records. Each view is built from a
// `Record` through explicit fallback chains, so a missing or renamed field
// never fails a listing; it just renders as the documented default.

pub mod device;
pub mod ngfw;
pub mod policy;
pub mod prefix_object;

pub use device::{ControlStatus, DeviceHealth, DeviceInventory};
pub use ngfw::{ListRef, NgfwRule, parse_ngfw_rules};
pub use policy::{DeviceAssociation, FeatureProfile, ParcelSummary, PolicyGroup};
pub use prefix_object::PrefixObject;
