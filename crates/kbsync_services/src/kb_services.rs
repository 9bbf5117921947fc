use std::sync::Arc;

use kbsync_domain::{Infrastructure, TransferConfig};

use crate::export::KbExporter;
use crate::inspect::KbInspector;
use crate::mdl::MdlExporter;
use crate::mutation::{CreateInstruction, CreateSqlPair};
use crate::runner::BulkTransferRunner;
use crate::verify::KbVerifier;

/// Entry point bundling every knowledge-base operation over one
/// infrastructure.
///
/// Type Parameters:
/// - F: the infrastructure providing row reading, GraphQL transport, the
///   vector store and file output.
pub struct KbServices<F> {
    infra: Arc<F>,
    exporter: KbExporter<F>,
    mdl_exporter: MdlExporter<F>,
    verifier: KbVerifier<F>,
    inspector: KbInspector<F>,
}

impl<F: Infrastructure> KbServices<F> {
    pub fn new(infra: Arc<F>) -> Self {
        Self {
            exporter: KbExporter::new(infra.clone()),
            mdl_exporter: MdlExporter::new(infra.clone()),
            verifier: KbVerifier::new(infra.clone()),
            inspector: KbInspector::new(infra.clone()),
            infra,
        }
    }

    pub fn sql_pair_importer(&self, config: &TransferConfig) -> BulkTransferRunner<F, CreateSqlPair> {
        BulkTransferRunner::new(self.infra.clone(), CreateSqlPair, config)
    }

    pub fn instruction_importer(
        &self,
        config: &TransferConfig,
    ) -> BulkTransferRunner<F, CreateInstruction> {
        BulkTransferRunner::new(self.infra.clone(), CreateInstruction, config)
    }

    pub fn exporter(&self) -> &KbExporter<F> {
        &self.exporter
    }

    pub fn mdl_exporter(&self) -> &MdlExporter<F> {
        &self.mdl_exporter
    }

    pub fn verifier(&self) -> &KbVerifier<F> {
        &self.verifier
    }

    pub fn inspector(&self) -> &KbInspector<F> {
        &self.inspector
    }
}
