pub mod insight_extraction;
