//! Recording [`TabHost`] used by the unit tests.

use super::host::{HostError, TabHandle, TabHost};
use std::cell::RefCell;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Enumerate,
    ActivateAt(usize),
    ActivateHandle(TabHandle),
    RemoveAt(usize),
}

#[derive(Debug, Clone)]
pub struct FakeTab {
    pub handle: TabHandle,
    pub path: Option<PathBuf>,
    pub modified: bool,
    pub views: usize,
}

#[derive(Debug)]
pub struct FakeHost {
    pub tabs: Vec<FakeTab>,
    pub current: usize,
    pub root: Option<PathBuf>,
    pub handle_activation: bool,
    pub fail_effects: bool,
    pub calls: RefCell<Vec<HostCall>>,
    next_handle: u64,
}

impl FakeHost {
    /// Tabs named `/work/<name>` under root `/work`; an empty name is unnamed.
    pub fn new(names: &[&str]) -> Self {
        let mut host = Self {
            tabs: Vec::new(),
            current: 0,
            root: Some(PathBuf::from("/work")),
            handle_activation: false,
            fail_effects: false,
            calls: RefCell::new(Vec::new()),
            next_handle: 100,
        };
        for name in names {
            host.push(name);
        }
        host
    }

    pub fn push(&mut self, name: &str) -> TabHandle {
        let handle = TabHandle::new(self.next_handle);
        self.next_handle += 1;
        self.tabs.push(FakeTab {
            handle,
            path: (!name.is_empty()).then(|| PathBuf::from("/work").join(name)),
            modified: false,
            views: 1,
        });
        handle
    }

    pub fn with_handle_activation(mut self, enabled: bool) -> Self {
        self.handle_activation = enabled;
        self
    }

    pub fn with_root(mut self, root: Option<&str>) -> Self {
        self.root = root.map(PathBuf::from);
        self
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.borrow().clone()
    }

    /// Calls other than catalog enumeration.
    pub fn effects(&self) -> Vec<HostCall> {
        self.calls()
            .into_iter()
            .filter(|c| *c != HostCall::Enumerate)
            .collect()
    }

    fn tab(&self, handle: TabHandle) -> Option<&FakeTab> {
        self.tabs.iter().find(|t| t.handle == handle)
    }

    fn check_index(&self, index: usize) -> Result<usize, HostError> {
        if self.fail_effects || index == 0 || index > self.tabs.len() {
            return Err(HostError::NoSuchIndex(index));
        }
        Ok(index - 1)
    }
}

impl TabHost for FakeHost {
    fn tab_handles(&self) -> Vec<TabHandle> {
        self.calls.borrow_mut().push(HostCall::Enumerate);
        self.tabs.iter().map(|t| t.handle).collect()
    }

    fn current_tab(&self) -> Option<TabHandle> {
        self.tabs.get(self.current).map(|t| t.handle)
    }

    fn primary_resource(&self, tab: TabHandle) -> Option<PathBuf> {
        self.tab(tab).and_then(|t| t.path.clone())
    }

    fn is_modified(&self, tab: TabHandle) -> bool {
        self.tab(tab).is_some_and(|t| t.modified)
    }

    fn view_count(&self, tab: TabHandle) -> usize {
        self.tab(tab).map_or(0, |t| t.views)
    }

    fn working_root(&self) -> Option<PathBuf> {
        self.root.clone()
    }

    fn activate_tab_at(&mut self, index: usize) -> Result<(), HostError> {
        self.calls.borrow_mut().push(HostCall::ActivateAt(index));
        self.current = self.check_index(index)?;
        Ok(())
    }

    fn remove_tab_at(&mut self, index: usize) -> Result<(), HostError> {
        self.calls.borrow_mut().push(HostCall::RemoveAt(index));
        let position = self.check_index(index)?;
        self.tabs.remove(position);
        self.current = self.current.min(self.tabs.len().saturating_sub(1));
        Ok(())
    }

    fn can_activate_by_handle(&self) -> bool {
        self.handle_activation
    }

    fn activate_tab(&mut self, tab: TabHandle) -> Result<(), HostError> {
        if !self.handle_activation {
            return Err(HostError::Unsupported);
        }
        self.calls.borrow_mut().push(HostCall::ActivateHandle(tab));
        match self.tabs.iter().position(|t| t.handle == tab) {
            Some(position) if !self.fail_effects => {
                self.current = position;
                Ok(())
            }
            _ => Err(HostError::NoSuchHandle(tab)),
        }
    }
}
