//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` instead of `String`, a pointer plus length instead of a map,
//! and tagged enums with explicit discriminants. Decoded query values may
//! contain NUL bytes (`%00`), so every conversion to `CString` is fallible
//! and surfaces as `FfiErrorCode::InteriorNul` instead of a panic.

use std::ffi::{c_void, CString, NulError};
use std::os::raw::c_char;

use query_core::{ExtractError, ResponseEnvelope};

/// A request header supplied by the caller. Both fields are NUL-terminated
/// UTF-8 strings that the library reads but never frees.
#[repr(C)]
pub struct FfiHeader {
    pub key: *const c_char,
    pub value: *const c_char,
}

/// One decoded query parameter.
#[repr(C)]
pub struct FfiQueryParam {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// The response envelope, with `params` in the order they appeared in the
/// URL (first appearance, last value).
#[repr(C)]
pub struct FfiEnvelope {
    pub message: *mut c_char,
    pub params: *mut FfiQueryParam,
    pub params_len: u32,
}

/// Error codes returned in `FfiExtractResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    MalformedUrl = 1,
    Deserialization = 2,
    Serialization = 3,
    InvalidUtf8 = 4,
    InteriorNul = 5,
    NullArg = 6,
    Panic = 7,
}

/// Tag that tells `query_free_result` what `FfiExtractResult::data` points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    /// `data` is a `*mut FfiEnvelope`.
    Envelope = 1,
    /// `data` is a NUL-terminated JSON `*mut c_char`.
    Json = 2,
}

/// Result envelope for every extract call.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the payload named by `data_tag`.
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, and `data` is null.
#[repr(C)]
pub struct FfiExtractResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiExtractResult {
    fn boxed(
        error_code: FfiErrorCode,
        error_message: *mut c_char,
        data_tag: FfiDataTag,
        data: *mut c_void,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiExtractResult {
            error_code,
            error_message,
            data_tag,
            data,
        }))
    }

    /// Build a success result carrying an `FfiEnvelope`.
    pub(crate) fn ok_envelope(envelope: ResponseEnvelope) -> *mut Self {
        match FfiEnvelope::from_core(envelope) {
            Ok(ffi) => Self::boxed(
                FfiErrorCode::Ok,
                std::ptr::null_mut(),
                FfiDataTag::Envelope,
                Box::into_raw(Box::new(ffi)) as *mut c_void,
            ),
            Err(e) => Self::interior_nul(e),
        }
    }

    /// Build a success result carrying a JSON string.
    pub(crate) fn ok_json(json: String) -> *mut Self {
        match CString::new(json) {
            Ok(json) => Self::boxed(
                FfiErrorCode::Ok,
                std::ptr::null_mut(),
                FfiDataTag::Json,
                json.into_raw() as *mut c_void,
            ),
            Err(e) => Self::interior_nul(e),
        }
    }

    /// Build an error result from an `ExtractError`.
    pub(crate) fn from_error(err: ExtractError) -> *mut Self {
        let code = match &err {
            ExtractError::MalformedUrl { .. } => FfiErrorCode::MalformedUrl,
            ExtractError::Deserialization(_) => FfiErrorCode::Deserialization,
            ExtractError::Serialization(_) => FfiErrorCode::Serialization,
        };
        Self::error(code, &err.to_string())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::NullArg, &format!("null argument: {name}"))
    }

    pub(crate) fn invalid_utf8(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::InvalidUtf8, &format!("argument is not UTF-8: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::Panic, msg)
    }

    fn interior_nul(err: NulError) -> *mut Self {
        Self::error(
            FfiErrorCode::InteriorNul,
            &format!("result contains a NUL byte at offset {}", err.nul_position()),
        )
    }

    fn error(code: FfiErrorCode, msg: &str) -> *mut Self {
        // messages built here never contain NUL; an empty string is the fallback
        let message = CString::new(msg).unwrap_or_default().into_raw();
        Self::boxed(code, message, FfiDataTag::None, std::ptr::null_mut())
    }
}

impl FfiEnvelope {
    /// Convert every string up front so nothing leaks if one of them holds
    /// a NUL byte.
    fn from_core(envelope: ResponseEnvelope) -> Result<Self, NulError> {
        let message = CString::new(envelope.message)?;
        let pairs = envelope
            .query
            .into_iter()
            .map(|(k, v)| -> Result<_, NulError> { Ok((CString::new(k)?, CString::new(v)?)) })
            .collect::<Result<Vec<_>, NulError>>()?;

        let params_len = pairs.len() as u32;
        let params = if pairs.is_empty() {
            std::ptr::null_mut()
        } else {
            let params: Box<[FfiQueryParam]> = pairs
                .into_iter()
                .map(|(k, v)| FfiQueryParam {
                    key: k.into_raw(),
                    value: v.into_raw(),
                })
                .collect();
            Box::into_raw(params) as *mut FfiQueryParam
        };

        Ok(FfiEnvelope {
            message: message.into_raw(),
            params,
            params_len,
        })
    }
}
