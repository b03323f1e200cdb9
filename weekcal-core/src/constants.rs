/// Remote collection holding every user's tasks.
pub const TASKS_COLLECTION: &str = "tasks";

/// Prefix of the per-user local snapshot key.
pub const SNAPSHOT_KEY_PREFIX: &str = "calendar-tasks-";

/// Field on remote records naming the owning user.
pub const OWNER_FIELD: &str = "userId";

pub const DEFAULT_SERVER_PORT: u16 = 4097;

pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com";

pub const DEFAULT_IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com";
