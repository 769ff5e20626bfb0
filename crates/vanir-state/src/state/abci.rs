use sha2::{Digest, Sha256};
use tendermint::abci::{request, response};
use tendermint::block::Header;
use tendermint::AppHash;

use super::*;

mod begin_block;
mod deliver_tx;
mod end_block;
mod init_chain;
