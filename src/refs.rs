use pdf_writer::Ref;
use std::collections::HashMap;

/// The kinds of indirect objects the document writes, used as stable keys so
/// objects can reference each other before their [Ref]s are allocated.
#[derive(Eq, PartialEq, Hash, Copy, Clone, Debug)]
pub enum RefType {
    Catalog,
    Info,
    PageTree,
    Page(usize),
    ContentForPage(usize),
    Font(usize),
    CidFont(usize),
    FontDescriptor(usize),
    FontData(usize),
    ToUnicode(usize),
}

/// Allocates and remembers object references while the document is written
pub struct ObjectReferences {
    refs: HashMap<RefType, Ref>,
    next_id: i32,
}

impl ObjectReferences {
    pub fn new() -> ObjectReferences {
        ObjectReferences {
            refs: HashMap::new(),
            next_id: 3,
        }
    }

    pub fn get(&self, ref_type: RefType) -> Option<Ref> {
        self.refs.get(&ref_type).copied()
    }

    pub fn gen(&mut self, ref_type: RefType) -> Ref {
        let id = Ref::new(self.next_id);
        self.next_id += 1;
        self.refs.insert(ref_type, id);
        id
    }
}
