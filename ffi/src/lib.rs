//! C-ABI wrapper around `query-core`.
//!
//! # Overview
//! Exposes the query extractor through `extern "C"` functions so a host
//! runtime written in any language with a C FFI can hand over an inbound
//! request and get the envelope back, without linking to serde or an async
//! runtime.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `query_extract` takes the URL and a header array and returns the
//!   envelope as structs; `query_extract_json` takes and returns JSON.
//! - A single `FfiExtractResult` with `FfiDataTag` + `void* data` conveys
//!   success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call
//!   `query_free_result` to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use query_core::RequestDescriptor;

use types::*;

// ---------------------------------------------------------------------------
// Extract
// ---------------------------------------------------------------------------

/// Borrow a C string as `&str`, or `None` if it is not UTF-8.
///
/// # Safety
/// `ptr` must be non-null and point to a NUL-terminated string that outlives
/// the returned slice.
unsafe fn borrow_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// Copy the caller's header array into owned pairs.
///
/// Returns the error result to hand back if any entry is null or not UTF-8.
fn read_headers(
    headers: *const FfiHeader,
    headers_len: u32,
) -> Result<Vec<(String, String)>, *mut FfiExtractResult> {
    if headers_len == 0 {
        return Ok(Vec::new());
    }
    if headers.is_null() {
        return Err(FfiExtractResult::null_arg("headers"));
    }
    let entries = unsafe { std::slice::from_raw_parts(headers, headers_len as usize) };
    entries
        .iter()
        .map(|h| {
            if h.key.is_null() || h.value.is_null() {
                return Err(FfiExtractResult::null_arg("header"));
            }
            let key = unsafe { borrow_str(h.key) }
                .ok_or_else(|| FfiExtractResult::invalid_utf8("header key"))?;
            let value = unsafe { borrow_str(h.value) }
                .ok_or_else(|| FfiExtractResult::invalid_utf8("header value"))?;
            Ok((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Resolve `url` against the `host` entry of `headers` and decode its query.
///
/// `headers` may be null when `headers_len` is 0.
/// Returns a result with `data_tag = Envelope` on success.
/// The caller must free the returned pointer with `query_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn query_extract(
    url: *const c_char,
    headers: *const FfiHeader,
    headers_len: u32,
) -> *mut FfiExtractResult {
    catch_unwind(|| {
        if url.is_null() {
            return FfiExtractResult::null_arg("url");
        }
        let Some(url) = (unsafe { borrow_str(url) }) else {
            return FfiExtractResult::invalid_utf8("url");
        };
        let headers = match read_headers(headers, headers_len) {
            Ok(h) => h,
            Err(result) => return result,
        };
        let request = RequestDescriptor {
            url: url.to_string(),
            headers,
        };
        match query_core::extract(&request) {
            Ok(envelope) => FfiExtractResult::ok_envelope(envelope),
            Err(e) => FfiExtractResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiExtractResult::panic("panic in query_extract"))
}

/// Same as `query_extract`, with a JSON descriptor in and a JSON envelope out.
///
/// The descriptor looks like `{"url": "/?a=1", "headers": [["host", "x"]]}`.
/// Returns a result with `data_tag = Json` on success.
#[unsafe(no_mangle)]
pub extern "C" fn query_extract_json(descriptor: *const c_char) -> *mut FfiExtractResult {
    catch_unwind(|| {
        if descriptor.is_null() {
            return FfiExtractResult::null_arg("descriptor");
        }
        let Some(descriptor) = (unsafe { borrow_str(descriptor) }) else {
            return FfiExtractResult::invalid_utf8("descriptor");
        };
        match query_core::extract_json(descriptor) {
            Ok(json) => FfiExtractResult::ok_json(json),
            Err(e) => FfiExtractResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiExtractResult::panic("panic in query_extract_json"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiExtractResult` returned by any `query_extract*` function.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn query_free_result(result: *mut FfiExtractResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_string(result.error_message);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::Envelope => {
                let envelope = unsafe { Box::from_raw(result.data as *mut FfiEnvelope) };
                free_envelope_fields(&envelope);
            }
            FfiDataTag::Json => free_string(result.data as *mut c_char),
            FfiDataTag::None => {}
        }
    });
}

/// Free the C-string fields and param array of an `FfiEnvelope` (but not the
/// struct itself).
fn free_envelope_fields(envelope: &FfiEnvelope) {
    free_string(envelope.message);
    if envelope.params.is_null() || envelope.params_len == 0 {
        return;
    }
    let slice = std::ptr::slice_from_raw_parts_mut(envelope.params, envelope.params_len as usize);
    let params = unsafe { Box::from_raw(slice) };
    for param in params.iter() {
        free_string(param.key);
        free_string(param.value);
    }
}

fn free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
