//! Writes typed key/value parameters into AWS Systems Manager Parameter Store.

pub mod configs;
pub mod context;
pub mod domain;
pub mod storage;
pub mod writer;

pub use configs::SetterConfig;
pub use context::{Interruption, RequestContext};
pub use domain::{DomainError, PutParameterRequest, ValueType};
pub use storage::repository::{ParameterStore, StoreError};
pub use writer::{ParameterWriter, SetterError};
