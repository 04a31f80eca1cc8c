pub mod google_aistudio;
pub mod google_tts;
