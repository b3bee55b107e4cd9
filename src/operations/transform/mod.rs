mod translate;

pub use translate::TranslateSelection;
