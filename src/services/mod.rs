pub mod llm;
pub mod stt;
pub mod upstream;
