pub mod test_policy;
