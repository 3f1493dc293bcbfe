//! Convenience macros for error handling and propagation

/// Equivalent to `anyhow::bail!` but for `SelfbotError`
///
/// # Examples
///
/// ```rust
/// use selfdot_common::bail;
/// use selfdot_common::Result;
///
/// fn check_value(value: i32) -> Result<()> {
///     if value < 0 {
///         bail!("Value cannot be negative: {}", value);
///     }
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::SelfbotError::new($msg))
    };
    ($err:expr $(,)?) => {
        return Err($crate::SelfbotError::new($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::SelfbotError::new(format!($fmt, $($arg)*)))
    };
}

/// Equivalent to `anyhow::ensure!` but for `SelfbotError`
///
/// # Examples
///
/// ```rust
/// use selfdot_common::ensure;
/// use selfdot_common::Result;
///
/// fn validate_positive(value: i32) -> Result<()> {
///     ensure!(value > 0, "Value must be positive, got: {}", value);
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:literal $(,)?) => {
        if !$cond {
            return Err($crate::SelfbotError::new($msg));
        }
    };
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err($crate::SelfbotError::new($err));
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::SelfbotError::new(format!($fmt, $($arg)*)));
        }
    };
}
