/// Name of one object class in the store (the unique key of its schema).
/// Examples: `Post`, `_User`
pub type ClassName = String;
/// Name of a field within a class schema.
/// Examples: `coverImage`, `gallery`
pub type FieldName = String;
/// Stable identifier of one stored record.
/// Example: `xWMyZ4YEGZ`
pub type ObjectId = String;
/// Stored file name, including any format prefix.
/// Examples: `tfss-4a607f2e-profile.png`, `a1b2c3d4-e5f6-7890-abcd-ef1234567890-photo.png`
pub type FileName = String;
/// Retrieval URL for a stored file.
/// Example: `https://files.example.com/app/tfss-4a607f2e-profile.png`
pub type FileUrl = String;
