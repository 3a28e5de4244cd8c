//! 任务森林
//!
//! 所有任务存放在一个数组里，父子关系用下标表示；根节点不是任务，
//! 只是 [`NodeRef::Root`] 这个哨兵，因此永远不能被挂到别的节点下面。

use crate::error::TreeError;
use crate::tasks::task::{Task, TaskId};
use std::collections::HashMap;

/// 树中的节点：森林根或某个任务
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Root,
    Task(TaskId),
}

/// 一个项目的全部任务
#[derive(Debug, Clone, Default)]
pub struct TaskForest {
    tasks: Vec<Task>,
    index: HashMap<String, TaskId>,
    roots: Vec<TaskId>,
}

impl TaskForest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn find_task_by_key(&self, key: &str) -> Option<TaskId> {
        self.index.get(key).copied()
    }

    pub fn task_by_key(&self, key: &str) -> Option<&Task> {
        self.find_task_by_key(key).and_then(|id| self.tasks.get(id))
    }

    /// 顶层任务（父节点为根）
    pub fn roots(&self) -> &[TaskId] {
        &self.roots
    }

    pub fn children_of(&self, node: NodeRef) -> &[TaskId] {
        match node {
            NodeRef::Root => &self.roots,
            NodeRef::Task(id) => self
                .tasks
                .get(id)
                .map(|t| t.children.as_slice())
                .unwrap_or(&[]),
        }
    }

    /// 按插入顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// 插入新任务并挂到 `parent` 下（追加到子节点末尾）
    pub fn insert(&mut self, mut task: Task, parent: NodeRef) -> Result<TaskId, TreeError> {
        if self.index.contains_key(&task.key) {
            return Err(TreeError::DuplicateKey(task.key));
        }
        self.check_node(parent)?;

        let id = self.tasks.len();
        task.parent = None;
        task.children.clear();
        self.index.insert(task.key.clone(), id);
        self.tasks.push(task);
        self.attach(id, parent);
        Ok(id)
    }

    /// 把 `node` 移到 `parent` 下，会先从原父节点摘除
    pub fn set_parent(&mut self, node: NodeRef, parent: NodeRef) -> Result<(), TreeError> {
        let id = match node {
            NodeRef::Root => return Err(TreeError::RootReparent),
            NodeRef::Task(id) => id,
        };
        self.check_node(node)?;
        self.check_node(parent)?;

        if let NodeRef::Task(parent_id) = parent {
            if parent_id == id || self.is_descendant(parent_id, id) {
                return Err(TreeError::Loop {
                    child: self.tasks[id].key.clone(),
                    parent: self.tasks[parent_id].key.clone(),
                });
            }
        }

        self.detach(id);
        self.attach(id, parent);
        Ok(())
    }

    /// `candidate` 是否位于 `ancestor` 的子树中
    fn is_descendant(&self, candidate: TaskId, ancestor: TaskId) -> bool {
        let mut current = self.tasks[candidate].parent;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.tasks[id].parent;
        }
        false
    }

    fn check_node(&self, node: NodeRef) -> Result<(), TreeError> {
        match node {
            NodeRef::Task(id) if id >= self.tasks.len() => Err(TreeError::UnknownNode(id)),
            _ => Ok(()),
        }
    }

    fn detach(&mut self, id: TaskId) {
        let siblings = match self.tasks[id].parent.take() {
            Some(parent_id) => &mut self.tasks[parent_id].children,
            None => &mut self.roots,
        };
        siblings.retain(|&c| c != id);
    }

    fn attach(&mut self, id: TaskId, parent: NodeRef) {
        match parent {
            NodeRef::Root => {
                self.tasks[id].parent = None;
                self.roots.push(id);
            }
            NodeRef::Task(parent_id) => {
                self.tasks[id].parent = Some(parent_id);
                self.tasks[parent_id].children.push(id);
            }
        }
    }

    /// 任务深度，顶层任务为 0
    pub fn depth(&self, id: TaskId) -> usize {
        let mut depth = 0;
        let mut current = self.tasks.get(id).and_then(|t| t.parent);
        while let Some(parent_id) = current {
            depth += 1;
            current = self.tasks[parent_id].parent;
        }
        depth
    }

    /// 深度优先先序遍历（父节点在前，子节点按挂载顺序），不含根
    pub fn to_pre_order_list(&self) -> Vec<&Task> {
        let mut ordered = Vec::with_capacity(self.tasks.len());
        let mut stack: Vec<TaskId> = self.roots.iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            let task = &self.tasks[id];
            ordered.push(task);
            stack.extend(task.children.iter().rev().copied());
        }

        ordered
    }

    /// 树形文本，用于调试日志
    pub fn render_tree(&self) -> String {
        let mut out = String::from("Root\n");
        self.render_children(&self.roots, "", &mut out);
        out
    }

    fn render_children(&self, children: &[TaskId], prefix: &str, out: &mut String) {
        for (i, &id) in children.iter().enumerate() {
            let last = i + 1 == children.len();
            let task = &self.tasks[id];
            out.push_str(prefix);
            out.push_str(if last { "└── " } else { "├── " });
            out.push_str(&task.key);
            out.push('\n');

            let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
            self.render_children(&task.children, &child_prefix, out);
        }
    }
}
