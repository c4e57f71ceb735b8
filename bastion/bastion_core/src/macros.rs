//! Convenience macros.

/// Log an event with the given level, prefixed with the calling module.
///
/// Key/value pairs after the message are rendered as `key=value` so log
/// lines stay greppable.
///
/// # Examples
///
/// ```
/// use bastion_core::log_event;
/// use bastion_core::utils::LogLevel;
///
/// log_event!(LogLevel::Info, "Editor opened");
///
/// log_event!(LogLevel::Warning, "Save blocked",
///     list => "deny",
///     message => "msg.addGroupPermission",
/// );
/// ```
#[macro_export]
macro_rules! log_event {
    ($level:expr, $message:expr) => {
        {
            use $crate::utils::LogLevel;
            match $level {
                LogLevel::Error => $crate::log::error!("[{}] {}", module_path!(), $message),
                LogLevel::Warning => $crate::log::warn!("[{}] {}", module_path!(), $message),
                LogLevel::Info => $crate::log::info!("[{}] {}", module_path!(), $message),
                LogLevel::Debug => $crate::log::debug!("[{}] {}", module_path!(), $message),
                LogLevel::Trace => $crate::log::trace!("[{}] {}", module_path!(), $message),
            }
        }
    };

    ($level:expr, $message:expr, $($key:ident => $value:expr),+ $(,)?) => {
        {
            use $crate::utils::LogLevel;
            let metadata = vec![$(format!("{}={}", stringify!($key), $value)),+].join(" ");
            match $level {
                LogLevel::Error => $crate::log::error!("[{}] {}: {}", module_path!(), $message, metadata),
                LogLevel::Warning => $crate::log::warn!("[{}] {}: {}", module_path!(), $message, metadata),
                LogLevel::Info => $crate::log::info!("[{}] {}: {}", module_path!(), $message, metadata),
                LogLevel::Debug => $crate::log::debug!("[{}] {}: {}", module_path!(), $message, metadata),
                LogLevel::Trace => $crate::log::trace!("[{}] {}: {}", module_path!(), $message, metadata),
            }
        }
    };
}
