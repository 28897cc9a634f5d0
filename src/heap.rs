/*!
  The heap owns every array cell the machine can address. It is an owning
  arena keyed by cell id: ids are handed out by a monotonically increasing
  counter and are never reused, so programs may rely on allocation order.
  Id 0 is reserved for the program cell, the array the machine fetches
  instructions from; it exists for the entire lifetime of a running machine.
*/

use std::collections::HashMap;

use crate::bytecode::Word;
use crate::error::MachineError;

pub type CellId = Word;

/// Id of the distinguished program cell.
pub const PROGRAM_CELL_ID: CellId = 0;

/// A dynamically allocated, independently addressable buffer of words.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArrayCell {
  pub id :  CellId,
  words  :  Vec<Word>
}

impl ArrayCell {
  fn new(id: CellId, size: Word) -> ArrayCell {
    ArrayCell {
      id,
      words: vec![0; size as usize]
    }
  }

  /// Length in words, not bytes.
  pub fn len(&self) -> Word {
    self.words.len() as Word
  }

  pub fn words(&self) -> &[Word] {
    &self.words
  }
}

pub struct Heap {
  cells   :  HashMap<CellId, ArrayCell>,
  next_id :  CellId
}

impl Heap {

  /// Creates a heap whose program cell holds the given codex words.
  pub fn with_program(words: Vec<Word>) -> Heap {
    let mut cells = HashMap::new();
    cells.insert(PROGRAM_CELL_ID, ArrayCell { id: PROGRAM_CELL_ID, words });
    Heap {
      cells,
      next_id: PROGRAM_CELL_ID + 1
    }
  }

  /// Creates a new zero-filled cell of `size` words and returns its id.
  pub fn allocate(&mut self, size: Word) -> CellId {
    let id = self.next_id;
    self.next_id += 1;
    self.cells.insert(id, ArrayCell::new(id, size));
    id
  }

  pub fn lookup(&self, id: CellId) -> Option<&ArrayCell> {
    self.cells.get(&id)
  }

  pub fn lookup_mut(&mut self, id: CellId) -> Option<&mut ArrayCell> {
    self.cells.get_mut(&id)
  }

  pub fn read(&self, id: CellId, offset: Word) -> Result<Word, MachineError> {
    let cell = self.lookup(id).ok_or(MachineError::UnknownArray(id))?;
    match cell.words.get(offset as usize) {
      Some(word) => Ok(*word),
      None => Err(MachineError::OutOfBounds { id, offset, length: cell.len() })
    }
  }

  pub fn write(&mut self, id: CellId, offset: Word, value: Word) -> Result<(), MachineError> {
    let cell = self.lookup_mut(id).ok_or(MachineError::UnknownArray(id))?;
    let length = cell.len();
    match cell.words.get_mut(offset as usize) {
      Some(word) => {
        *word = value;
        Ok(())
      }
      None => Err(MachineError::OutOfBounds { id, offset, length })
    }
  }

  /**
    Copies the addressed cell's contents into a fresh program cell, discarding
    the previous one. `id == PROGRAM_CELL_ID` is a no-op: cell 0 already is
    the program, so no copy is needed.
  */
  pub fn replace_program(&mut self, id: CellId) -> Result<(), MachineError> {
    if id == PROGRAM_CELL_ID {
      return Ok(());
    }
    let words = self.lookup(id).ok_or(MachineError::UnknownArray(id))?.words.clone();
    self.cells.insert(PROGRAM_CELL_ID, ArrayCell { id: PROGRAM_CELL_ID, words });
    Ok(())
  }

  /**
    Releases the cell's storage. A freed id becomes unusable and is never
    reused; the id counter keeps advancing. The program cell cannot be
    abandoned.
  */
  pub fn free(&mut self, id: CellId) -> Result<(), MachineError> {
    if id == PROGRAM_CELL_ID {
      return Err(MachineError::AbandonedProgram);
    }
    match self.cells.remove(&id) {
      Some(cell) => {
        debug_assert_eq!(cell.id, id);
        Ok(())
      }
      None => Err(MachineError::UnknownArray(id))
    }
  }

  /// Number of live cells, the program cell included.
  pub fn cell_count(&self) -> usize {
    self.cells.len()
  }
}
