pub mod sqlite_ledger;

#[cfg(test)]
pub mod test_support;
