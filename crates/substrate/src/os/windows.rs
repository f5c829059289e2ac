//! Windows-specific backends mirroring [`super::posix`]'s surface.

use super::files::StdStream;
use windows_sys::Win32::Foundation::GetLastError;
use windows_sys::Win32::System::Console::{
    GetConsoleMode, GetStdHandle, STD_ERROR_HANDLE, STD_INPUT_HANDLE, STD_OUTPUT_HANDLE,
};
use windows_sys::Win32::System::Diagnostics::Debug::{
    FormatMessageW, FORMAT_MESSAGE_FROM_SYSTEM, FORMAT_MESSAGE_IGNORE_INSERTS,
};
use windows_sys::Win32::System::Threading::IsDebuggerPresent;

pub(super) fn get_last_error() -> u32 {
    unsafe { GetLastError() }
}

pub(super) fn format_message(code: u32) -> String {
    let mut buf = [0u16; 4096];
    let len = unsafe {
        FormatMessageW(
            FORMAT_MESSAGE_FROM_SYSTEM | FORMAT_MESSAGE_IGNORE_INSERTS,
            std::ptr::null(),
            code,
            0,
            buf.as_mut_ptr(),
            buf.len() as u32,
            std::ptr::null(),
        )
    };
    if len == 0 {
        return format!("unknown error {code}");
    }
    String::from_utf16_lossy(&buf[..len as usize])
        .trim_end()
        .to_string()
}

pub(super) fn is_tty(fd: StdStream) -> bool {
    let handle_id = match fd {
        StdStream::Stdin => STD_INPUT_HANDLE,
        StdStream::Stdout => STD_OUTPUT_HANDLE,
        StdStream::Stderr => STD_ERROR_HANDLE,
    };
    unsafe {
        let handle = GetStdHandle(handle_id);
        let mut mode = 0u32;
        GetConsoleMode(handle, &mut mode) != 0
    }
}

pub(super) fn is_debugger_present() -> bool {
    unsafe { IsDebuggerPresent() != 0 }
}
