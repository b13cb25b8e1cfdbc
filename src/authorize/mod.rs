mod run_authorizer;

pub(crate) use run_authorizer::*;
