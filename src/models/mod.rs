pub mod api_key;
pub mod deployment;
pub mod machine;
pub mod run;
pub mod workflow;
pub mod workflow_version;
