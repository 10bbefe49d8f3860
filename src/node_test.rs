use super::*;

#[test]
fn test_node() {
    let mut node: Node<u32, u32> = Node::new(10, 200);
    assert_eq!(node.to_height(), 0);
    assert_eq!(node.is_leaf(), true);
    assert_eq!(node.to_left().is_none(), true);
    assert_eq!(node.to_right().is_none(), true);
    assert_eq!(node.to_parent().is_none(), true);
    assert_eq!(*node.as_key(), 10);
    assert_eq!(*node.as_value(), 200);

    assert_eq!(node.set_value(300), 200);
    assert_eq!(*node.as_value(), 300);

    let id = NodeId {
        index: 3,
        generation: 1,
    };
    node.left = Some(id);
    assert_eq!(node.is_leaf(), false);
    assert_eq!(format!("{:?}", id), "NodeId(3@1)");

    assert_eq!(node.into_entry(), (10, 300));
    assert!(EMPTY_HEIGHT < 0);
}
