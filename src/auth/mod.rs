//! Authentication module
//!
//! Credential-flow helpers invoked through the adapter seam.
//!
//! # Overview
//!
//! - Basic, custom-header, and custom-querystring decoration
//! - Session token exchange (POST login, extract token, set header)
//! - OAuth2 two-legged client credentials
//! - JWT bearer (service-account assertion exchange)
//! - OneLogin client-credentials grant

mod schemes;

pub use schemes::{
    basic_auth, custom_header_and_basic_auth, custom_header_auth, custom_querystring_auth,
    jwt_auth, oauth2_client_credentials_auth, onelogin_auth, session_token_auth,
};
