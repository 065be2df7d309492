use std::error::Error;
use std::fmt::{Display, Formatter};

pub type LcaResult<T> = Result<T, LcaError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LcaErrorCategory {
    InputValidationError,
    IoSystemError,
    ComputationError,
    InternalError,
}

impl LcaErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::ComputationError => 4,
            Self::InternalError => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::ComputationError => "ComputationError",
            Self::InternalError => "InternalError",
        }
    }
}

/// Hard failure reported to the caller before or around a calculation.
///
/// Soft data-quality conditions (unmapped materials, invalid volumes, missing
/// floor area) never produce an `LcaError`; they are carried in the results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LcaError {
    category: LcaErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl LcaError {
    pub fn new(
        category: LcaErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(LcaErrorCategory::InputValidationError, placeholder, message)
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(LcaErrorCategory::IoSystemError, placeholder, message)
    }

    pub fn computation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(LcaErrorCategory::ComputationError, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(LcaErrorCategory::InternalError, placeholder, message)
    }

    pub const fn category(&self) -> LcaErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder, self.message)
    }
}

impl Display for LcaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.as_str(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for LcaError {}
