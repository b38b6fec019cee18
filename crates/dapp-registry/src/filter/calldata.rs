//! Calldata helpers shared by the filters

use alloy_sol_types::{SolCall, SolType, SolValue};

/// First four bytes of a call
pub type Selector = [u8; 4];

/// The selector of `data`, if it is long enough to have one
pub fn selector(data: &[u8]) -> Option<Selector> {
    data.get(..4)?.try_into().ok()
}

/// Whether `data` starts with the selector of `C`
pub fn is_call<C: SolCall>(data: &[u8]) -> bool {
    selector(data) == Some(C::SELECTOR)
}

/// Decode `data` as a call to `C`.
///
/// Only the canonical encoding is accepted: trailing bytes, dirty padding
/// or odd offsets make the call undecodable.
pub fn decode<C: SolCall>(data: &[u8]) -> Option<C> {
    let call = C::abi_decode(data).ok()?;
    (SolCall::abi_encode(&call) == data).then_some(call)
}

/// Decode a single ABI-encoded value, canonical encoding only
pub fn decode_value<T>(data: &[u8]) -> Option<T>
where
    T: SolValue + From<<T::SolType as SolType>::RustType>,
{
    let value = <T as SolValue>::abi_decode(data).ok()?;
    (SolValue::abi_encode(&value) == data).then_some(value)
}
