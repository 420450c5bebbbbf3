//! FFI bindings for Habit Heat
//!
//! This module provides C-compatible functions for calling the engine from UI
//! hosts written in other languages. All functions take C strings
//! (null-terminated) and return allocated memory that must be freed by the
//! caller using `habit_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::adapter::StoreAdapter;
use crate::config::EngineConfig;
use crate::date_key::parse_date_key;
use crate::intensity::bucket;
use crate::pipeline::{checkins_to_range_counts, habits_to_dashboard, habits_to_stats, DashboardEngine};
use crate::rate::rolling_rate;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Read three required string arguments, recording which one was bad
unsafe fn store_args(
    habits: *const c_char,
    checkins: *const c_char,
    evaluation_day: *const c_char,
) -> Option<(String, String, String)> {
    let Some(habits) = cstr_to_string(habits) else {
        set_last_error("Invalid habits JSON string pointer");
        return None;
    };
    let Some(checkins) = cstr_to_string(checkins) else {
        set_last_error("Invalid check-ins JSON string pointer");
        return None;
    };
    let Some(day) = cstr_to_string(evaluation_day) else {
        set_last_error("Invalid evaluation day string pointer");
        return None;
    };
    Some((habits, checkins, day))
}

// ============================================================================
// Stateless API
// ============================================================================

/// Compute a dashboard snapshot from store JSON.
///
/// # Safety
/// - `habits_json`, `checkins_json`, and `evaluation_day` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `habit_free_string`.
/// - Returns NULL on error; call `habit_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn habit_dashboard(
    habits_json: *const c_char,
    checkins_json: *const c_char,
    evaluation_day: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some((habits, checkins, day)) = store_args(habits_json, checkins_json, evaluation_day)
    else {
        return ptr::null_mut();
    };

    match habits_to_dashboard(habits, checkins, day) {
        Ok(snapshot) => string_to_cstr(&snapshot),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Per-habit lifetime statistics from store JSON.
///
/// # Safety
/// - `habits_json`, `checkins_json`, and `evaluation_day` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `habit_free_string`.
/// - Returns NULL on error; call `habit_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn habit_stats(
    habits_json: *const c_char,
    checkins_json: *const c_char,
    evaluation_day: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some((habits, checkins, day)) = store_args(habits_json, checkins_json, evaluation_day)
    else {
        return ptr::null_mut();
    };

    match habits_to_stats(habits, checkins, day) {
        Ok(stats) => string_to_cstr(&stats),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Day-by-day check-in counts for the inclusive range `from`..=`to`.
///
/// # Safety
/// - `checkins_json`, `from`, and `to` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `habit_free_string`.
/// - Returns NULL on error (including `to` before `from`); call `habit_last_error`.
#[no_mangle]
pub unsafe extern "C" fn habit_range_counts(
    checkins_json: *const c_char,
    from: *const c_char,
    to: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(checkins) = cstr_to_string(checkins_json) else {
        set_last_error("Invalid check-ins JSON string pointer");
        return ptr::null_mut();
    };
    let (Some(from), Some(to)) = (cstr_to_string(from), cstr_to_string(to)) else {
        set_last_error("Invalid range bound string pointer");
        return ptr::null_mut();
    };

    match checkins_to_range_counts(checkins, from, to) {
        Ok(counts) => string_to_cstr(&counts),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Rolling completion rate (raw counting) over `window_days` ending at `evaluation_day`.
///
/// # Safety
/// - `checkins_json` and `evaluation_day` must be valid null-terminated C strings.
/// - Returns the percentage, or -1 on error; call `habit_last_error` for details.
#[no_mangle]
pub unsafe extern "C" fn habit_rolling_rate(
    checkins_json: *const c_char,
    habit_count: u32,
    window_days: u32,
    evaluation_day: *const c_char,
) -> i64 {
    clear_last_error();

    let Some(checkins_str) = cstr_to_string(checkins_json) else {
        set_last_error("Invalid check-ins JSON string pointer");
        return -1;
    };
    let Some(day_str) = cstr_to_string(evaluation_day) else {
        set_last_error("Invalid evaluation day string pointer");
        return -1;
    };

    let parsed = StoreAdapter::parse_checkins(&checkins_str)
        .and_then(|checkins| parse_date_key(&day_str).map(|day| (checkins, day)));

    match parsed {
        Ok((checkins, day)) => i64::from(rolling_rate(&checkins, habit_count as usize, window_days, day)),
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Heatmap intensity level (0-4) for a day's check-in count.
#[no_mangle]
pub extern "C" fn habit_intensity(count: u32) -> u8 {
    bucket(count)
}

// ============================================================================
// Configured Engine API
// ============================================================================

/// Opaque handle to a DashboardEngine
pub struct HabitEngineHandle {
    engine: DashboardEngine,
}

/// Create an engine from a JSON configuration, or defaults when `config_json` is NULL.
///
/// # Safety
/// - `config_json` must be NULL or a valid null-terminated C string.
/// - Returns a pointer that must be freed with `habit_engine_free`.
/// - Returns NULL on error; call `habit_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn habit_engine_new(config_json: *const c_char) -> *mut HabitEngineHandle {
    clear_last_error();

    let config = if config_json.is_null() {
        Ok(EngineConfig::default())
    } else {
        match cstr_to_string(config_json) {
            Some(json) => EngineConfig::from_json(&json),
            None => {
                set_last_error("Invalid config string pointer");
                return ptr::null_mut();
            }
        }
    };

    match config.and_then(DashboardEngine::with_config) {
        Ok(engine) => Box::into_raw(Box::new(HabitEngineHandle { engine })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free an engine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `habit_engine_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn habit_engine_free(engine: *mut HabitEngineHandle) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

/// Compute a dashboard snapshot with a configured engine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `habit_engine_new`.
/// - `habits_json`, `checkins_json`, and `evaluation_day` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `habit_free_string`.
/// - Returns NULL on error; call `habit_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn habit_engine_dashboard(
    engine: *const HabitEngineHandle,
    habits_json: *const c_char,
    checkins_json: *const c_char,
    evaluation_day: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }

    let handle = &*engine;

    let Some((habits, checkins, day)) = store_args(habits_json, checkins_json, evaluation_day)
    else {
        return ptr::null_mut();
    };

    match handle.engine.process_json(&habits, &checkins, &day) {
        Ok(snapshot) => string_to_cstr(&snapshot),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Habit Heat functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Habit Heat function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn habit_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Habit Heat call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn habit_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn habit_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
