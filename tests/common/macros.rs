/// Asserts that the node at `$id` has registered message `$key`.
#[macro_export]
macro_rules! assert_received {
    ($network:expr, $id:expr, $key:expr) => {
        let node = $network.node($id).expect("Node not found in network");
        assert!(
            node.store.contains(&$key),
            "Node {} should have received {} but holds {:?}",
            $id,
            $key,
            node.store.received
        );
    };
}

/// Asserts that the node at `$id` has not registered message `$key`.
#[macro_export]
macro_rules! assert_not_received {
    ($network:expr, $id:expr, $key:expr) => {
        let node = $network.node($id).expect("Node not found in network");
        assert!(
            !node.store.contains(&$key),
            "Node {} should not have received {}",
            $id,
            $key
        );
    };
}

/// Asserts that the node's gradient currently carries no source.
#[macro_export]
macro_rules! assert_gradient_bottom {
    ($network:expr, $id:expr) => {
        let export = $network.export($id).expect("Node not found in network");
        assert!(
            export.gradient.is_bottom(),
            "Node {} should see no source but sees {} at {}",
            $id,
            export.gradient.source,
            export.gradient.distance
        );
    };
}
