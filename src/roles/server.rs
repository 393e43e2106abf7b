use std::sync::RwLock;
use rabe_bn::{G1, G2};
use tracing::debug;
use crate::{
    error::MpeckError,
    schemes::mpeck::{test, MpeckDocument, MpeckTrapdoor},
    utils::aes::SealedPayload
};
#[cfg(feature = "serde")]
use serde::{Serialize, Deserialize};
#[cfg(feature = "borsh")]
use borsh::{BorshSerialize, BorshDeserialize};

/// One search hit: the sealed payload plus what the reader needs to decrypt it.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchResult {
    pub ct: SealedPayload,
    pub a: G2,
    pub b: G2,
    pub b_hat: G1,
}

/// The untrusted store. It runs the test algorithm but never decrypts.
///
/// It holds no scheme parameters, in particular not the keyword hash key.
#[derive(Debug)]
pub struct Server {
    documents: RwLock<Vec<(SealedPayload, MpeckDocument)>>,
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

impl Server {
    pub fn new() -> Server {
        Server {
            documents: RwLock::new(Vec::new()),
        }
    }

    /// Appends a document and returns its position in the store.
    pub fn upload(&self, ct: SealedPayload, doc: MpeckDocument) -> Result<usize, MpeckError> {
        let mut documents = self.documents.write()?;
        documents.push((ct, doc));
        let id = documents.len() - 1;
        debug!(id, "stored document");
        Ok(id)
    }

    /// Tests `trapdoor` against every stored document on behalf of the reader with key index `reader`.
    pub fn search(&self, reader: usize, trapdoor: &MpeckTrapdoor) -> Result<Vec<SearchResult>, MpeckError> {
        let documents = self.documents.read()?;
        let results: Vec<SearchResult> = documents
            .iter()
            .filter(|(_, doc)| test(reader, doc, trapdoor))
            .filter_map(|(ct, doc)| {
                let b = doc.share(reader)?;
                let b_hat = doc.share_hat(reader)?;
                Some(SearchResult {
                    ct: ct.clone(),
                    a: doc.a,
                    b,
                    b_hat,
                })
            })
            .collect();
        debug!(reader, scanned = documents.len(), hits = results.len(), "searched documents");
        Ok(results)
    }

    /// Number of stored documents.
    pub fn len(&self) -> Result<usize, MpeckError> {
        Ok(self.documents.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, MpeckError> {
        Ok(self.len()? == 0)
    }
}
