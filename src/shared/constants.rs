/// Latency sample name for presigned upload URL generation
pub const GENERATE_UPLOAD_URL_METRIC: &str = "GenerateUploadUrlMetric";

/// Principal reported by the authorizer when a request is denied
pub const ANONYMOUS_PRINCIPAL: &str = "user";
