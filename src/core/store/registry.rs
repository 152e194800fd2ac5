// Windows registry backend for user and machine environment variables.
// Successful writes are announced with WM_SETTINGCHANGE so Explorer and new
// shells see them without a logoff.
use std::io;

use windows_sys::Win32::UI::WindowsAndMessaging::{
    HWND_BROADCAST, SMTO_ABORTIFHUNG, SendMessageTimeoutW, WM_SETTINGCHANGE,
};
use winreg::enums::{
    HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_QUERY_VALUE, KEY_SET_VALUE, RegType,
};
use winreg::{RegKey, RegValue};

use crate::core::error::{Error, ErrorKind};
use crate::core::scope::Scope;
use crate::core::store::{VarStore, store_error_kind};

const USER_KEY: &str = "Environment";
const MACHINE_KEY: &str = r"SYSTEM\CurrentControlSet\Control\Session Manager\Environment";
const BROADCAST_TIMEOUT_MS: u32 = 5000;

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct RegistryStore;

impl RegistryStore {
    fn open(scope: Scope, access: u32) -> Result<RegKey, Error> {
        let (hive, path) = match scope {
            Scope::User => (RegKey::predef(HKEY_CURRENT_USER), USER_KEY),
            Scope::Machine => (RegKey::predef(HKEY_LOCAL_MACHINE), MACHINE_KEY),
            Scope::Process => {
                return Err(Error::new(ErrorKind::Internal)
                    .with_message("registry does not hold process-scope values")
                    .with_scope(scope));
            }
        };
        hive.open_subkey_with_flags(path, access)
            .map_err(|err| registry_error(err, "failed to open environment key", scope))
    }
}

impl VarStore for RegistryStore {
    fn read(&self, name: &str, scope: Scope) -> Result<Option<String>, Error> {
        let key = Self::open(scope, KEY_QUERY_VALUE)?;
        match key.get_value::<String, _>(name) {
            Ok(value) => {
                tracing::debug!(%scope, name, "read registry value");
                Ok(Some(value))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(registry_error(err, "failed to read registry value", scope)),
        }
    }

    fn write(&mut self, name: &str, scope: Scope, value: &str) -> Result<(), Error> {
        let key = Self::open(scope, KEY_QUERY_VALUE | KEY_SET_VALUE)?;
        // Keep REG_EXPAND_SZ so entries like %SystemRoot% still expand.
        let vtype = match key.get_raw_value(name) {
            Ok(RegValue {
                vtype: RegType::REG_EXPAND_SZ,
                ..
            }) => RegType::REG_EXPAND_SZ,
            _ => RegType::REG_SZ,
        };
        let raw = RegValue {
            bytes: wide_bytes(value),
            vtype,
        };
        key.set_raw_value(name, &raw)
            .map_err(|err| registry_error(err, "failed to write registry value", scope))?;
        tracing::debug!(%scope, name, bytes = value.len(), "wrote registry value");
        broadcast_environment_change();
        Ok(())
    }
}

fn wide_bytes(value: &str) -> Vec<u8> {
    value
        .encode_utf16()
        .chain(std::iter::once(0))
        .flat_map(u16::to_le_bytes)
        .collect()
}

fn broadcast_environment_change() {
    let param: Vec<u16> = "Environment"
        .encode_utf16()
        .chain(std::iter::once(0))
        .collect();
    let mut result: usize = 0;
    // SAFETY: `param` is a NUL-terminated UTF-16 string alive for the call.
    let sent = unsafe {
        SendMessageTimeoutW(
            HWND_BROADCAST,
            WM_SETTINGCHANGE,
            0,
            param.as_ptr() as isize,
            SMTO_ABORTIFHUNG,
            BROADCAST_TIMEOUT_MS,
            &mut result,
        )
    };
    if sent == 0 {
        tracing::warn!("environment change broadcast did not complete");
    }
}

fn registry_error(err: io::Error, message: &str, scope: Scope) -> Error {
    let kind = store_error_kind(&err);
    let mut error = Error::new(kind)
        .with_message(message)
        .with_scope(scope)
        .with_source(err);
    if kind == ErrorKind::Permission && scope == Scope::Machine {
        error = error.with_hint("Machine scope needs an elevated (administrator) prompt.");
    }
    error
}

#[cfg(test)]
mod tests {
    use super::wide_bytes;

    #[test]
    fn wide_bytes_are_nul_terminated_utf16le() {
        assert_eq!(wide_bytes("C:"), vec![b'C', 0, b':', 0, 0, 0]);
    }
}
