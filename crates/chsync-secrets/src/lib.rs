//! Sensitive-field detection and masking
//!
//! Connector properties whose names look like credentials are reported as
//! [`SensitiveField`]s and can be replaced in place by `${PARAMETER}`
//! references. Values that already are references are never flagged, so
//! masking twice is a no-op.

mod detector;
mod naming;

pub use detector::{SensitiveField, detect, is_parameter_reference, mask_decomposed};
pub use naming::{is_sensitive_name, to_parameter_identifier, to_upper_snake};
