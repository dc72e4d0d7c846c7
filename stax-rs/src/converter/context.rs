use crate::factory::{DocumentBuilderFactory, OutputProperties};

/// Per-conversion overrides of the converter defaults.
#[derive(Debug, Clone, Default)]
pub struct ConversionContext {
    document_builder_factory: Option<DocumentBuilderFactory>,
    output_properties: Option<OutputProperties>,
}

impl ConversionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document_builder_factory(mut self, factory: DocumentBuilderFactory) -> Self {
        self.document_builder_factory = Some(factory);
        self
    }

    pub fn with_output_properties(mut self, properties: OutputProperties) -> Self {
        self.output_properties = Some(properties);
        self
    }

    pub fn document_builder_factory(&self) -> Option<&DocumentBuilderFactory> {
        self.document_builder_factory.as_ref()
    }

    pub fn output_properties(&self) -> Option<&OutputProperties> {
        self.output_properties.as_ref()
    }
}
