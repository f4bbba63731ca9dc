use std::collections::{HashMap, VecDeque};

use crate::models::{Comment, CommentId, CommentView, UserId};

/// Parent-to-children adjacency of one feedback's comments, rebuilt for
/// every read. Children keep the order they were given in.
pub struct CommentTree {
    children: HashMap<Option<CommentId>, Vec<Comment>>,
}

impl CommentTree {
    /// Build from comments already sorted by creation time.
    pub fn build(comments: Vec<Comment>) -> Self {
        let mut children: HashMap<Option<CommentId>, Vec<Comment>> = HashMap::new();
        for comment in comments {
            children.entry(comment.parent_id).or_default().push(comment);
        }
        Self { children }
    }

    /// Top-level comments with their full reply subtrees.
    pub fn threads(
        &self,
        viewer: UserId,
        author: &dyn Fn(UserId) -> (String, String),
    ) -> Vec<CommentView> {
        self.children_of(None)
            .iter()
            .map(|comment| self.view(comment, viewer, author))
            .collect()
    }

    /// One comment with its replies attached, at any depth.
    pub fn view(
        &self,
        comment: &Comment,
        viewer: UserId,
        author: &dyn Fn(UserId) -> (String, String),
    ) -> CommentView {
        let (user_name, user_role) = author(comment.user_id);
        CommentView {
            comment: comment.clone(),
            user_name,
            user_role,
            liked_by_user: comment.is_liked_by(viewer),
            replies: self
                .children_of(Some(comment.id))
                .iter()
                .map(|reply| self.view(reply, viewer, author))
                .collect(),
        }
    }

    /// `root` followed by every transitive reply, parents before children.
    pub fn subtree_ids(&self, root: CommentId) -> Vec<CommentId> {
        let mut ids = Vec::new();
        let mut queue = VecDeque::from([root]);
        while let Some(id) = queue.pop_front() {
            ids.push(id);
            queue.extend(self.children_of(Some(id)).iter().map(|c| c.id));
        }
        ids
    }

    fn children_of(&self, parent: Option<CommentId>) -> &[Comment] {
        self.children.get(&parent).map(Vec::as_slice).unwrap_or(&[])
    }
}
