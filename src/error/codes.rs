/// Error code registry
///
/// Error codes are organized by category:
/// - 1000-1999: Request errors (rejected before any store access)
/// - 2000-2999: Input dataset errors
/// - 3000-3999: Store errors
/// - 9000-9999: Internal errors
pub struct ErrorCode;

impl ErrorCode {
    // Request errors (1000-1999)
    pub const INVALID_PERCENT: u16 = 1001;
    pub const INVALID_REQUEST: u16 = 1002;

    // Input dataset errors (2000-2999)
    pub const ATTRIBUTE_NOT_FOUND: u16 = 2001;
    pub const DATASET_NOT_FOUND: u16 = 2002;
    pub const MALFORMED_DATASET: u16 = 2003;

    // Store errors (3000-3999)
    pub const OUTPUT_ALREADY_EXISTS: u16 = 3001;
    pub const STORE_UNAVAILABLE: u16 = 3002;

    // Internal errors (9000-9999)
    pub const INTERNAL: u16 = 9004;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        ErrorCode::INVALID_PERCENT => "Training percentage outside 0-100",
        ErrorCode::INVALID_REQUEST => "Invalid split request",
        ErrorCode::ATTRIBUTE_NOT_FOUND => "Attribute not found in dataset",
        ErrorCode::DATASET_NOT_FOUND => "Input dataset not found",
        ErrorCode::MALFORMED_DATASET => "Input dataset could not be parsed",
        ErrorCode::OUTPUT_ALREADY_EXISTS => "Output dataset already exists",
        ErrorCode::STORE_UNAVAILABLE => "Dataset store unavailable",
        ErrorCode::INTERNAL => "Internal invariant violated",
        _ => "Unknown error code",
    }
}
