// Mappers - reshape client data into what the Gemini API accepts

pub mod history;
pub mod prompt;
