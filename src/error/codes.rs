/// Error code registry for phonekit
///
/// Error codes are organized by category:
/// - 2000-2999: Session errors
/// - 3000-3999: Storage errors
pub struct ErrorCode;

impl ErrorCode {
    // Session errors (2000-2999)
    pub const SESSION_NOT_FOUND: u16 = 2001;
    pub const SESSION_ALREADY_ACTIVE: u16 = 2002;
    pub const SESSION_INVALID_STATE: u16 = 2006;
    pub const SESSION_PERMISSION_DENIED: u16 = 2007;
    pub const SESSION_UNAUTHENTICATED: u16 = 2008;
    pub const SESSION_INVALID_REQUEST: u16 = 2009;
    pub const DEVICE_NOT_FOUND: u16 = 2010;
    pub const DEVICE_PLATFORM_UNSUPPORTED: u16 = 2011;
    pub const METHOD_UNKNOWN: u16 = 2020;
    pub const SERVICE_UNKNOWN: u16 = 2021;

    // Storage errors (3000-3999)
    pub const STORAGE_GENERIC: u16 = 3000;
    pub const STORAGE_IO_ERROR: u16 = 3001;
    pub const STORAGE_CORRUPTED: u16 = 3006;
    pub const STORAGE_SERIALIZATION_ERROR: u16 = 3011;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        ErrorCode::SESSION_NOT_FOUND => "Session not found",
        ErrorCode::SESSION_ALREADY_ACTIVE => "An active session already exists for this device",
        ErrorCode::SESSION_INVALID_STATE => "Operation not allowed in the current session state",
        ErrorCode::SESSION_PERMISSION_DENIED => "Session belongs to another user",
        ErrorCode::SESSION_UNAUTHENTICATED => "Caller identity missing",
        ErrorCode::SESSION_INVALID_REQUEST => "Malformed request parameter",
        ErrorCode::DEVICE_NOT_FOUND => "Device not found",
        ErrorCode::DEVICE_PLATFORM_UNSUPPORTED => "Device platform not supported by this service",
        ErrorCode::METHOD_UNKNOWN => "Method not available for this service",
        ErrorCode::SERVICE_UNKNOWN => "Unknown service type",

        ErrorCode::STORAGE_GENERIC => "General storage error",
        ErrorCode::STORAGE_IO_ERROR => "Storage I/O error",
        ErrorCode::STORAGE_CORRUPTED => "Stored data is corrupted",
        ErrorCode::STORAGE_SERIALIZATION_ERROR => "Failed to serialize data",
        _ => "Unknown error code",
    }
}
