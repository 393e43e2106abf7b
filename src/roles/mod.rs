//! The parties of a delegated MPECK deployment.
//!
//! An owner encrypts for itself. A consultant keeps a registry of clients and
//! uploads on their behalf, so both the client and the consultant can search
//! and read the document. A client (a delegate of one consultant) uploads
//! documents readable by itself and its consultant. Every upload made for a
//! client carries that client's tag keyword in the reserved slot 0, which lets
//! the consultant restrict a search to one client.
//!
//! The [`Server`] stores documents and answers trapdoors. It never sees a
//! secret key or the keyword hash key of the [`Mpeck`] instance.
pub mod server;

use std::{
    collections::BTreeMap,
    sync::Arc
};
use tracing::debug;
use crate::{
    error::MpeckError,
    schemes::mpeck::{Mpeck, MpeckKeyPair, MpeckPublicKey},
    utils::slots::{client_tag, KeywordIndex}
};
pub use self::server::{SearchResult, Server};

/// What a [`Person`] may do, and whom its uploads are readable by.
#[derive(Clone, PartialEq, Debug)]
pub enum Capability {
    /// Uploads readable by the owner alone.
    Owner,
    /// Uploads on behalf of registered clients, readable by the client and the consultant.
    Consultant {
        clients: BTreeMap<String, MpeckPublicKey>,
    },
    /// A client of the given consultant. Uploads are readable by the client and the consultant.
    Delegate(MpeckPublicKey),
}

/// A party holding a key pair, bound to one scheme instance, keyword index and server.
#[derive(Debug)]
pub struct Person {
    scheme: Arc<Mpeck>,
    keywords: Arc<KeywordIndex>,
    server: Arc<Server>,
    keys: MpeckKeyPair,
    capability: Capability,
}

impl Person {
    fn new(
        scheme: Arc<Mpeck>,
        keywords: Arc<KeywordIndex>,
        server: Arc<Server>,
        capability: Capability,
    ) -> Person {
        let keys = scheme.keygen();
        Person {
            scheme,
            keywords,
            server,
            keys,
            capability,
        }
    }

    pub fn owner(scheme: Arc<Mpeck>, keywords: Arc<KeywordIndex>, server: Arc<Server>) -> Person {
        Person::new(scheme, keywords, server, Capability::Owner)
    }

    pub fn consultant(scheme: Arc<Mpeck>, keywords: Arc<KeywordIndex>, server: Arc<Server>) -> Person {
        Person::new(
            scheme,
            keywords,
            server,
            Capability::Consultant {
                clients: BTreeMap::new(),
            },
        )
    }

    /// Creates a client of `consultant` and registers its tag keyword.
    pub fn client(
        scheme: Arc<Mpeck>,
        keywords: Arc<KeywordIndex>,
        server: Arc<Server>,
        consultant: &MpeckPublicKey,
    ) -> Result<Person, MpeckError> {
        let person = Person::new(scheme, keywords, server, Capability::Delegate(consultant.clone()));
        person.keywords.register_client(person.keys.pk.index)?;
        Ok(person)
    }

    pub fn public_key(&self) -> &MpeckPublicKey {
        &self.keys.pk
    }

    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    /// Adds a client to a consultant's registry under `name`.
    pub fn register_client(&mut self, name: &str, pk: MpeckPublicKey) -> Result<(), MpeckError> {
        match &mut self.capability {
            Capability::Consultant { clients } => {
                self.keywords.register_client(pk.index)?;
                debug!(client = pk.index, "registered client");
                clients.insert(name.to_string(), pk);
                Ok(())
            }
            _ => Err(MpeckError::Capability(String::from("only a consultant registers clients"))),
        }
    }

    /// Uploads a document tagged with `keywords`. Not available to consultants, see [`upload_for`](Self::upload_for).
    pub fn upload<S: AsRef<str>>(&self, document: &[u8], keywords: &[S]) -> Result<usize, MpeckError> {
        self.upload_with(None, document, keywords)
    }

    /// Uploads a document on behalf of the registered client `client`.
    pub fn upload_for<S: AsRef<str>>(
        &self,
        client: &str,
        document: &[u8],
        keywords: &[S],
    ) -> Result<usize, MpeckError> {
        self.upload_with(Some(client), document, keywords)
    }

    /// Searches the server for documents carrying all `keywords` and decrypts every hit.
    pub fn search<S: AsRef<str>>(&self, keywords: &[S]) -> Result<Vec<Vec<u8>>, MpeckError> {
        self.search_with(None, keywords)
    }

    /// Like [`search`](Self::search), restricted to documents uploaded for the registered client `client`.
    pub fn search_client<S: AsRef<str>>(
        &self,
        client: &str,
        keywords: &[S],
    ) -> Result<Vec<Vec<u8>>, MpeckError> {
        match &self.capability {
            Capability::Consultant { clients } => {
                let pk = clients
                    .get(client)
                    .ok_or_else(|| MpeckError::UnknownClient(client.to_string()))?;
                self.search_with(Some(client_tag(pk.index)), keywords)
            }
            _ => Err(MpeckError::Capability(String::from("only a consultant searches per client"))),
        }
    }

    // the authorized key set and the tag keyword of an upload
    fn authorized(&self, client: Option<&str>) -> Result<(Vec<MpeckPublicKey>, Option<String>), MpeckError> {
        let own = self.keys.pk.clone();
        match (&self.capability, client) {
            (Capability::Owner, None) => Ok((vec![own], None)),
            (Capability::Delegate(consultant), None) => {
                let tag = client_tag(own.index);
                Ok((vec![consultant.clone(), own], Some(tag)))
            }
            (Capability::Consultant { clients }, Some(name)) => {
                let pk = clients
                    .get(name)
                    .ok_or_else(|| MpeckError::UnknownClient(name.to_string()))?;
                Ok((vec![pk.clone(), own], Some(client_tag(pk.index))))
            }
            (Capability::Consultant { .. }, None) => Err(MpeckError::Capability(String::from(
                "a consultant uploads on behalf of a client",
            ))),
            (_, Some(_)) => Err(MpeckError::Capability(String::from(
                "only a consultant uploads on behalf of a client",
            ))),
        }
    }

    fn upload_with<S: AsRef<str>>(
        &self,
        client: Option<&str>,
        document: &[u8],
        keywords: &[S],
    ) -> Result<usize, MpeckError> {
        let (authorized, tag) = self.authorized(client)?;
        let mut tagged: Vec<String> = keywords.iter().map(|kw| kw.as_ref().to_string()).collect();
        tagged.extend(tag);
        let slots = self.keywords.expand(&tagged)?;
        let (ct, doc) = self.scheme.encode(&self.keywords, &authorized, &slots, document)?;
        self.server.upload(ct, doc)
    }

    fn search_with<S: AsRef<str>>(
        &self,
        tag: Option<String>,
        keywords: &[S],
    ) -> Result<Vec<Vec<u8>>, MpeckError> {
        let mut tagged: Vec<String> = keywords.iter().map(|kw| kw.as_ref().to_string()).collect();
        tagged.extend(tag);
        let query = self.keywords.query(&tagged)?;
        let trapdoor = self.scheme.trapdoor(&self.keys.sk, &query)?;
        self.server
            .search(self.keys.pk.index, &trapdoor)?
            .iter()
            .map(|hit| self.scheme.decrypt(&self.keys.sk, &hit.ct, &hit.a, &hit.b_hat))
            .collect()
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    fn setup() -> (Arc<Mpeck>, Arc<KeywordIndex>, Arc<Server>) {
        let scheme = Arc::new(Mpeck::setup());
        let keywords = Arc::new(KeywordIndex::new());
        let server = Arc::new(Server::new());
        (scheme, keywords, server)
    }

    fn strings(docs: Vec<Vec<u8>>) -> Vec<String> {
        let mut out: Vec<String> = docs.into_iter().map(|d| String::from_utf8(d).unwrap()).collect();
        out.sort();
        out
    }

    #[test]
    fn consultant_and_clients() {
        let (scheme, keywords, server) = setup();
        let mut consultant = Person::consultant(scheme.clone(), keywords.clone(), server.clone());
        let alice = Person::client(scheme.clone(), keywords.clone(), server.clone(), consultant.public_key()).unwrap();
        let bob = Person::client(scheme.clone(), keywords.clone(), server.clone(), consultant.public_key()).unwrap();
        consultant.register_client("alice", alice.public_key().clone()).unwrap();
        consultant.register_client("bob", bob.public_key().clone()).unwrap();

        assert_eq!(keywords.add("tax-returns").unwrap(), 1);
        assert_eq!(keywords.add("2022").unwrap(), 2);
        assert_eq!(keywords.add_alias("2023", "2022").unwrap(), 2);

        alice.upload(b"I have no money!", &["tax-returns", "2022"]).unwrap();
        assert_eq!(strings(alice.search(&["tax-returns"]).unwrap()), vec!["I have no money!"]);

        consultant.upload_for("bob", b"bob's 2023 return", &["tax-returns", "2023"]).unwrap();
        // alice's trapdoor never opens bob's document
        assert!(alice.search(&["2023"]).unwrap().is_empty());

        alice.upload(b"alice's 2023 return", &["tax-returns", "2023"]).unwrap();
        assert_eq!(strings(alice.search(&["2023"]).unwrap()), vec!["alice's 2023 return"]);
        assert_eq!(strings(bob.search(&["tax-returns"]).unwrap()), vec!["bob's 2023 return"]);

        assert_eq!(
            strings(consultant.search(&["2023"]).unwrap()),
            vec!["alice's 2023 return", "bob's 2023 return"]
        );
        assert_eq!(
            strings(consultant.search(&["tax-returns", "2022"]).unwrap()),
            vec!["I have no money!"]
        );
        assert_eq!(
            strings(consultant.search_client("bob", &["tax-returns"]).unwrap()),
            vec!["bob's 2023 return"]
        );
        let none: [&str; 0] = [];
        assert_eq!(
            strings(consultant.search_client("alice", &none).unwrap()),
            vec!["I have no money!", "alice's 2023 return"]
        );
        assert_eq!(server.len().unwrap(), 3);
    }

    #[test]
    fn owner() {
        let (scheme, keywords, server) = setup();
        let owner = Person::owner(scheme.clone(), keywords.clone(), server.clone());
        let consultant = Person::consultant(scheme.clone(), keywords.clone(), server.clone());
        keywords.add("invoices").unwrap();
        owner.upload(b"private", &["invoices"]).unwrap();
        assert_eq!(strings(owner.search(&["invoices"]).unwrap()), vec!["private"]);
        assert!(consultant.search(&["invoices"]).unwrap().is_empty());
        assert_eq!(owner.capability(), &Capability::Owner);
    }

    #[test]
    fn capabilities() {
        let (scheme, keywords, server) = setup();
        let mut owner = Person::owner(scheme.clone(), keywords.clone(), server.clone());
        let consultant = Person::consultant(scheme.clone(), keywords.clone(), server.clone());
        let mut client = Person::client(scheme.clone(), keywords.clone(), server.clone(), consultant.public_key()).unwrap();
        keywords.add("A").unwrap();
        assert!(matches!(owner.upload_for("x", b"x", &["A"]), Err(MpeckError::Capability(_))));
        assert!(matches!(consultant.upload(b"x", &["A"]), Err(MpeckError::Capability(_))));
        assert_eq!(
            consultant.upload_for("nobody", b"x", &["A"]),
            Err(MpeckError::UnknownClient(String::from("nobody")))
        );
        assert!(matches!(
            client.register_client("x", consultant.public_key().clone()),
            Err(MpeckError::Capability(_))
        ));
        assert!(matches!(
            owner.register_client("x", consultant.public_key().clone()),
            Err(MpeckError::Capability(_))
        ));
        assert!(matches!(client.search_client("x", &["A"]), Err(MpeckError::Capability(_))));
        assert_eq!(
            client.upload(b"x", &["B"]),
            Err(MpeckError::UnknownKeyword(String::from("B")))
        );
        assert!(server.is_empty().unwrap());
    }
}
