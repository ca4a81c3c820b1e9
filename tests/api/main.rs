mod health_check;
mod helpers;

// black-box tests are most robust, as they reflect exactly how clients
// interact with the app (request type, path, headers)
//
// integration tests are built in target/debug/deps (one per tests/*.rs file
// or tests/* directory); grouping them in a single dir keeps the (entirely
// sequential) linking phase down to one executable
