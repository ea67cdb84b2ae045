pub mod annotator_factory;
