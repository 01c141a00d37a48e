// Thin wrappers over the `log` facade. The binary decides where the records go.

#[macro_export]
#[doc(hidden)]
macro_rules! log {
    ($($arg:tt)*) => {
        ::log::info!($($arg)*)
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! dbg_log {
    ($($arg:tt)*) => {
        #[cfg(debug_assertions)]
        ::log::debug!($($arg)*)
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! error_log {
    ($($arg:tt)*) => {
        ::log::error!($($arg)*)
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        ::log::warn!($($arg)*)
    };
}
