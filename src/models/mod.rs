pub mod alert;
pub mod channel;
pub mod option_contract;

pub use alert::{
    percent_gain, trailing_stop_level, Alert, AlertKey, ChannelClass, InstrumentClass, Priced,
};
pub use channel::{ChannelBinding, SENTINEL_USER_ID};
pub use option_contract::{ContractType, OptionContract};
