//! BTHome v2 advertisement decoding.
//!
//! The parser validates the service identifier and protocol version, then
//! scans the payload as a sequence of `[object id][value]` records. The
//! value width, signedness, scale and unit come from the field table in
//! `registry`; the scan itself never hard-codes a field. An unknown object
//! id or a value cut off by the end of the payload stops the whole scan
//! (ids imply length, so the remainder cannot be segmented) and is
//! reported alongside the measurements decoded up to that point.
//!
//! Byte offsets and envelope constants live in `layout`, wire conventions
//! in `reader`.
//!
//! Version française (résumé):
//! Le module décode les annonces BTHome v2: validation de l'enveloppe
//! (identifiant de service, version), puis balayage des enregistrements
//! `[id][valeur]` selon la table `registry`. Un id inconnu ou une valeur
//! tronquée arrête le balayage entier; les mesures déjà décodées sont
//! conservées.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod registry;

pub use error::{FrameError, Truncated};
pub use parser::{DecodedPayload, Measurement, decode_frame, decode_payload, validate_frame};
