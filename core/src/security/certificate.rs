/*
 * certificate.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Vnet, a blocking networking library.
 *
 * Vnet is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Vnet is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Vnet.  If not, see <http://www.gnu.org/licenses/>.
 */

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};

use super::SecurityError;

struct CertificateContext {
    chain: Vec<CertificateDer<'static>>,
    key: Option<PrivateKeyDer<'static>>,
}

/// An X.509 certificate chain, optionally paired with its private key.
/// Cloning a certificate shares the underlying context; the context is
/// released when the last clone is dropped.
pub struct Certificate {
    context: Arc<CertificateContext>,
}

impl Certificate {
    /// Certificate from raw DER, no private key.
    pub fn from_der(der: Vec<u8>) -> Certificate {
        Certificate {
            context: Arc::new(CertificateContext {
                chain: vec![CertificateDer::from(der)],
                key: None,
            }),
        }
    }

    /// Certificate chain from a PEM file, no private key.
    pub fn from_pem_file(path: impl AsRef<Path>) -> Result<Certificate, SecurityError> {
        let chain = read_pem_chain(path.as_ref())?;
        Ok(Certificate {
            context: Arc::new(CertificateContext { chain, key: None }),
        })
    }

    /// Certificate chain plus private key, both from PEM files. This is
    /// the form a server context needs.
    pub fn from_pem_files(
        cert_path: impl AsRef<Path>,
        key_path: impl AsRef<Path>,
    ) -> Result<Certificate, SecurityError> {
        let chain = read_pem_chain(cert_path.as_ref())?;
        let mut reader = open_pem(key_path.as_ref())?;
        let key = rustls_pemfile::private_key(&mut reader)
            .map_err(|e| SecurityError::from_io(&e))?
            .ok_or_else(|| {
                SecurityError::new(
                    SecurityError::CODE_BAD_CONFIGURATION,
                    format!("no private key in {}", key_path.as_ref().display()),
                )
            })?;
        Ok(Certificate {
            context: Arc::new(CertificateContext {
                chain,
                key: Some(key),
            }),
        })
    }

    /// DER bytes of the leaf certificate.
    pub fn der(&self) -> &[u8] {
        &self.context.chain[0]
    }

    pub fn chain(&self) -> &[CertificateDer<'static>] {
        &self.context.chain
    }

    pub fn key(&self) -> Option<PrivateKeyDer<'static>> {
        self.context.key.as_ref().map(|k| k.clone_key())
    }

    pub fn has_private_key(&self) -> bool {
        self.context.key.is_some()
    }

    /// How many clones currently share the context.
    pub fn reference_count(&self) -> usize {
        Arc::strong_count(&self.context)
    }
}

impl Clone for Certificate {
    fn clone(&self) -> Certificate {
        Certificate {
            context: Arc::clone(&self.context),
        }
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Certificate) -> bool {
        self.context.chain == other.context.chain
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("chain_len", &self.context.chain.len())
            .field("has_private_key", &self.has_private_key())
            .finish()
    }
}

fn open_pem(path: &Path) -> Result<BufReader<File>, SecurityError> {
    let file = File::open(path).map_err(|e| SecurityError::from_io(&e))?;
    Ok(BufReader::new(file))
}

fn read_pem_chain(path: &Path) -> Result<Vec<CertificateDer<'static>>, SecurityError> {
    let mut reader = open_pem(path)?;
    let chain = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, io::Error>>()
        .map_err(|e| SecurityError::from_io(&e))?;
    if chain.is_empty() {
        return Err(SecurityError::new(
            SecurityError::CODE_BAD_CONFIGURATION,
            format!("no certificates in {}", path.display()),
        ));
    }
    Ok(chain)
}

/// A named, in-memory collection of certificates. Duplicates are
/// refused and removal of an absent certificate is an error.
#[derive(Debug)]
pub struct CertificateStore {
    name: String,
    certificates: Vec<Certificate>,
}

impl CertificateStore {
    pub fn new(name: impl Into<String>) -> CertificateStore {
        CertificateStore {
            name: name.into(),
            certificates: Vec::new(),
        }
    }

    /// Store populated with every certificate in a PEM file.
    pub fn open_pem_file(
        name: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<CertificateStore, SecurityError> {
        let chain = read_pem_chain(path.as_ref())?;
        let certificates = chain
            .into_iter()
            .map(|der| Certificate::from_der(der.as_ref().to_vec()))
            .collect();
        Ok(CertificateStore {
            name: name.into(),
            certificates,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_certificate(&mut self, certificate: Certificate) -> Result<(), SecurityError> {
        if self.certificates.contains(&certificate) {
            return Err(SecurityError::new(
                SecurityError::CODE_BAD_CONFIGURATION,
                "certificate is already in the store",
            ));
        }
        self.certificates.push(certificate);
        Ok(())
    }

    pub fn delete_certificate(&mut self, certificate: &Certificate) -> Result<(), SecurityError> {
        if let Some(pos) = self.certificates.iter().position(|c| c == certificate) {
            self.certificates.remove(pos);
            Ok(())
        } else {
            Err(SecurityError::new(
                SecurityError::CODE_BAD_CONFIGURATION,
                "certificate is not in the store",
            ))
        }
    }

    pub fn certificate_count(&self) -> usize {
        self.certificates.len()
    }

    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }
}
