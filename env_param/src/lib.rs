//! Process-wide parameters whose value may be overridden through an environment variable.
//!
//! A parameter is declared as a `static` holding the name of the environment variable and the
//! textual default value. The value is parsed on first access and cached for the rest of the process.
//!
//! ```
//! use env_param::EnvParam;
//! static LINE_WIDTH: EnvParam<usize> = EnvParam::new("EXAMPLE_LINE_WIDTH", "80");
//!
//! // the environment variable is not set, the default is used
//! assert_eq!(LINE_WIDTH.get(), 80);
//! ```
//!
//! Because the value is cached, changing the environment variable after the first read has no effect.
//! [`EnvParam::set`] forces a value before the first read, which is mostly useful in tests.

use once_cell::sync::OnceCell;
use std::fmt::Display;
use std::str::FromStr;

pub struct EnvParam<T> {
    value: OnceCell<T>,
    env: &'static str,
    default: &'static str,
}

impl<T> EnvParam<T> {
    /// Declares a parameter read from the variable `env`, falling back to the textual `default`.
    pub const fn new(env: &'static str, default: &'static str) -> EnvParam<T> {
        EnvParam {
            value: OnceCell::new(),
            env,
            default,
        }
    }

    /// Name of the environment variable backing this parameter.
    pub fn name(&self) -> &'static str {
        self.env
    }
}

impl<T: FromStr> EnvParam<T>
where
    T::Err: Display,
{
    fn parse_default(&self) -> T {
        T::from_str(self.default)
            .unwrap_or_else(|e| panic!("[env_param] {}: invalid default value {:?}: {e}", self.env, self.default))
    }

    fn resolve(&self) -> T {
        match std::env::var(self.env) {
            Ok(raw) => match T::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    eprintln!(
                        "[env_param] WARNING {}: ignoring value {raw:?} ({e}), using default {:?}",
                        self.env, self.default
                    );
                    self.parse_default()
                }
            },
            Err(_) => self.parse_default(),
        }
    }

    /// Returns a reference to the value, reading the environment on first access.
    ///
    /// # Panic
    /// Panics if the default value cannot be parsed. An unparsable environment value only emits a warning.
    pub fn get_ref(&self) -> &T {
        self.value.get_or_init(|| self.resolve())
    }

    /// Returns a copy of the value, reading the environment on first access.
    pub fn get(&self) -> T
    where
        T: Copy,
    {
        *self.get_ref()
    }

    /// Forces the value of the parameter.
    ///
    /// # Panic
    /// Panics if the parameter was already read or set.
    pub fn set(&self, value: T) {
        if self.value.set(value).is_err() {
            panic!("[env_param] {} was already initialized", self.env);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_value_when_unset() {
        static P: EnvParam<u32> = EnvParam::new("ENV_PARAM_TEST_UNSET_VARIABLE", "7");
        assert_eq!(P.get(), 7);
        assert_eq!(P.name(), "ENV_PARAM_TEST_UNSET_VARIABLE");
    }

    #[test]
    fn forced_value() {
        static P: EnvParam<String> = EnvParam::new("ENV_PARAM_TEST_FORCED_VARIABLE", "abc");
        P.set("xyz".to_string());
        assert_eq!(P.get_ref(), "xyz");
    }

    #[test]
    #[should_panic]
    fn set_after_read() {
        static P: EnvParam<bool> = EnvParam::new("ENV_PARAM_TEST_SET_AFTER_READ", "true");
        assert!(P.get());
        P.set(false);
    }
}
