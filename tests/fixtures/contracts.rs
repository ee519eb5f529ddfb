// Contract types for the Contoso sample API.

mod Contoso {
    use serde::{Deserialize, Serialize};
    use std::collections::HashMap;

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Page<T> {
        pub items: Vec<T>,
        pub total_count: i64,
        pub continuation_token: Option<String>,
    }

    #[derive(Serialize, Deserialize)]
    pub struct TreeNode {
        pub value: String,
        pub children: Vec<TreeNode>,
        pub parent: Option<Box<TreeNode>>,
        pub labels: HashMap<String, String>,
    }
}
