//! Wire model of the upstream API: request bodies, the response envelope,
//! endpoint payloads and the tolerant scalar decoders they rely on.

pub mod decode;
pub mod envelope;
pub mod enums;
pub mod request;
pub mod response;

pub use decode::{BalanceAmount, FlexString};
pub use envelope::{Envelope, ErrorResponse, Meta};
pub use enums::{AccountStatus, CallbackStatus, DisbursementStatus};
pub use request::{CreateDisbursementRequest, ListFilter, LoginRequest};
pub use response::{BalanceData, CallbackPayload, DisbursementData, DisbursementStatusData, LoginData};
