// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Traits for reading generic trajectory files.

use crate::errors::ReadTrajError;
use crate::progress::{ProgressPrinter, ProgressStatus};
use crate::system::System;
use std::marker::PhantomData;
use std::path::Path;

/*********************************************/
/*  TrajFile and supported trajectory files  */
/*********************************************/

/// Any trajectory file must implement this trait.
/// Note that the exact nature of the trajectory file is not relevant,
/// but the `FrameData::from_frame` function must be able to read it.
pub trait TrajFile {}

/*****************************/
/*  TrajRead and TrajReader  */
/*****************************/

/// Trait that must be implemented by structure storing data from a single trajectory frame.
pub trait FrameData {
    type TrajFile: TrajFile;

    /// Method specifying how a frame of the trajectory should be read and stored in the `FrameData` structure.
    ///
    /// Should return `None` once the end of the file is cleanly reached.
    fn from_frame(
        traj_file: &mut Self::TrajFile,
        system: &System,
    ) -> Option<Result<Self, ReadTrajError>>
    where
        Self: Sized;

    /// Method specifying how the `System` structure should be updated based on the data in the `FrameData` structure.
    fn update_system(self, system: &mut System);
}

/// Any structure implementing `TrajRead` can be used to read a trajectory file.
pub trait TrajRead<'a> {
    type FrameData: FrameData;

    /// Method specifying how to open the trajectory file.
    /// This function should return structure implementing `TrajRead`.
    fn new(system: &'a mut System, filename: impl AsRef<Path>) -> Result<Self, ReadTrajError>
    where
        Self: Sized;

    /// Method specifying how to get a mutable pointer to the `System` structure.
    /// Mutable pointer to the `System` structure must be part of the trajectory reader.
    fn get_system(&mut self) -> *mut System;

    /// Method specifying how to get a mutable handle to the file containing the trajectory.
    fn get_file_handle(
        &mut self,
    ) -> &mut <<Self as TrajRead<'a>>::FrameData as FrameData>::TrajFile;
}

/// Wrapper for any structure implementing `TrajRead` so the `Iterator` trait can be implemented for it.
pub struct TrajReader<'a, R: TrajRead<'a>> {
    pub traj_reader: R,
    progress_printer: Option<ProgressPrinter>,
    frame_number: usize,
    finished: bool,
    _phantom: &'a PhantomData<R>,
}

impl<'a, R> TrajReader<'a, R>
where
    R: TrajRead<'a>,
{
    /// Wrap trajectory reader implementing `TrajRead` into `TrajReader` structure.
    pub fn wrap_traj(traj_reader: R) -> TrajReader<'a, R> {
        TrajReader {
            traj_reader,
            progress_printer: None,
            frame_number: 0,
            finished: false,
            _phantom: &PhantomData,
        }
    }
}

/// Iterate the `TrajReader`.
impl<'a, R: TrajRead<'a>> Iterator for TrajReader<'a, R> {
    type Item = Result<&'a mut System, ReadTrajError>;

    /// Read the next frame in the trajectory file and update the `System` structure.
    ///
    /// ## Returns
    /// - `Some(Ok(&mut System))` if the frame has been succesfully read.
    /// - `Some(Err(ReadTrajError))` if the frame could not be read.
    /// - `None` if the end of the trajectory file has been reached
    ///   or if reading of a previous frame failed.
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        unsafe {
            let system = self.traj_reader.get_system();

            let result =
                match R::FrameData::from_frame(self.traj_reader.get_file_handle(), &*system) {
                    None => None,
                    Some(Err(e)) => Some(Err(e)),
                    Some(Ok(data)) => {
                        data.update_system(&mut *system);
                        Some(Ok(&mut *system))
                    }
                };

            if !matches!(result, Some(Ok(_))) {
                self.finished = true;
            }

            self.progress_set(&result);
            self.progress_print(
                self.frame_number,
                (*system).get_simulation_step(),
                (*system).get_simulation_time(),
            );

            if matches!(result, Some(Ok(_))) {
                self.frame_number += 1;
            }

            result
        }
    }
}

/***************************************/
/*        TrajMasterRead trait         */
/***************************************/

/// This trait is implemented by all trajectory readers so they can be used in generic functions.
pub trait TrajMasterRead<'a>:
    Iterator<Item = Result<&'a mut System, ReadTrajError>> + ProgressPrintable
{
    /// Print progress of the trajectory reading. This can be applied to any trajectory reader.
    ///
    /// ## Example
    /// ```no_run
    /// use hbond_occurrence::prelude::*;
    ///
    /// let mut system = System::from_file("topology.pdb").unwrap();
    ///
    /// // information will be printed every 10 trajectory frames
    /// let printer = ProgressPrinter::new().with_print_freq(10);
    ///
    /// for raw_frame in system.dcd_iter("trajectory.dcd").unwrap().print_progress(printer) {
    ///     let frame = raw_frame.unwrap();
    ///     // perform some analysis
    /// }
    /// ```
    fn print_progress(mut self, printer: ProgressPrinter) -> Self
    where
        Self: Sized,
    {
        self.set_progress_printer(printer);
        self
    }
}

impl<'a, R: TrajRead<'a>> TrajMasterRead<'a> for TrajReader<'a, R> {}

/***************************************/
/*     ProgressPrintable trait         */
/***************************************/

/// This trait is implemented for all trajectory readers and
/// allows for printing of the progress of the trajectory reading.
pub trait ProgressPrintable {
    /// Set the status of the progress printer associated with the trajectory reader according to the progress of the reading.
    fn progress_set(&mut self, result: &Option<Result<&mut System, ReadTrajError>>) {
        if let Some(printer) = self.get_progress_printer_mut() {
            match result {
                None => printer.set_status(ProgressStatus::Completed),
                Some(Err(_)) => printer.set_status(ProgressStatus::Failed),
                Some(Ok(_)) => (),
            }
        }
    }

    /// Print the current progress of the trajectory reading.
    fn progress_print(&mut self, frame_number: usize, simulation_step: u64, simulation_time: f32) {
        if let Some(printer) = self.get_progress_printer_mut() {
            printer.print(frame_number, simulation_step, simulation_time)
        }
    }

    /// Return mutable pointer to the progress printer associated with the trajectory reader.
    fn get_progress_printer_mut(&mut self) -> Option<&mut ProgressPrinter>;

    /// Associate progress printer with the trajectory reader.
    fn set_progress_printer(&mut self, printer: ProgressPrinter);
}

impl<'a, R: TrajRead<'a>> ProgressPrintable for TrajReader<'a, R> {
    fn get_progress_printer_mut(&mut self) -> Option<&mut ProgressPrinter> {
        self.progress_printer.as_mut()
    }

    fn set_progress_printer(&mut self, printer: ProgressPrinter) {
        self.progress_printer = Some(printer);
    }
}

/***************************************/
/*        Generic System methods       */
/***************************************/

/// ## Generic methods for iterating over trajectory files.
impl System {
    /// Iterate over any trajectory file implementing a trajectory reader.
    /// A 'trajectory reader' is any structure implementing the `TrajRead` trait.
    ///
    /// ## Returns
    /// `TrajReader<TrajRead>` if the trajectory file has been successfully opened.
    /// `ReadTrajError` in case of an error.
    ///
    /// ## Example
    /// ```no_run
    /// use hbond_occurrence::prelude::*;
    /// use hbond_occurrence::errors::ReadTrajError;
    ///
    /// fn example_fn() -> Result<(), ReadTrajError> {
    ///     let mut system = System::from_file("topology.pdb").unwrap();
    ///
    ///     for raw_frame in system.traj_iter::<DcdReader>("trajectory.dcd")? {
    ///         let frame = raw_frame?;
    ///         println!("{:?}", frame.get_atom(0).map(|atom| atom.get_position()));
    ///     }
    ///
    ///     Ok(())
    /// }
    /// ```
    ///
    /// ## Notes
    /// - The `System` structure is modified while iterating through the trajectory.
    pub fn traj_iter<'a, Read>(
        &'a mut self,
        filename: impl AsRef<Path>,
    ) -> Result<TrajReader<'a, Read>, ReadTrajError>
    where
        Read: TrajRead<'a>,
    {
        Ok(TrajReader::wrap_traj(Read::new(self, filename)?))
    }
}

/**************************/
/*       UNIT TESTS       */
/**************************/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;
    use crate::test_utilities::utilities::compare_systems;
    use std::fs::File;
    use tempfile::NamedTempFile;

    #[test]
    fn traj_iter_formats_agree() {
        let mut system_gro = System::from_file("test_files/hbond.gro").unwrap();
        let mut system_pdb = System::from_file("test_files/hbond.pdb").unwrap();
        let mut system_dcd = System::from_file("test_files/hbond.pdb").unwrap();

        let mut n_frames = 0;
        for ((raw1, raw2), raw3) in system_gro
            .traj_iter::<GroReader>("test_files/hbond_traj.gro")
            .unwrap()
            .zip(
                system_pdb
                    .traj_iter::<PdbReader>("test_files/hbond_traj.pdb")
                    .unwrap(),
            )
            .zip(
                system_dcd
                    .traj_iter::<DcdReader>("test_files/hbond_traj.dcd")
                    .unwrap(),
            )
        {
            let frame1 = raw1.unwrap();
            let frame2 = raw2.unwrap();
            let frame3 = raw3.unwrap();

            compare_systems(frame1, frame2);
            compare_systems(frame1, frame3);
            n_frames += 1;
        }

        assert_eq!(n_frames, 3);
    }

    #[test]
    fn traj_iter_stops_after_error() {
        let mut system = System::from_file("test_files/hbond.gro").unwrap();

        let mut iterator = system
            .traj_iter::<GroReader>("test_files/hbond_traj_mismatch.gro")
            .unwrap();

        assert!(iterator.next().unwrap().is_err());
        assert!(iterator.next().is_none());
        assert!(iterator.next().is_none());
    }

    #[test]
    fn traj_iter_print_progress() {
        let output = NamedTempFile::new().unwrap();
        let path_to_output = output.path().to_owned();
        let handle = output.reopen().unwrap();

        let printer = ProgressPrinter::new()
            .with_output(Box::from(handle))
            .with_colored(false)
            .with_print_freq(1)
            .with_terminating("\n");

        let mut system = System::from_file("test_files/hbond.gro").unwrap();
        let n_frames = system
            .gro_iter("test_files/hbond_traj.gro")
            .unwrap()
            .print_progress(printer)
            .count();

        assert_eq!(n_frames, 3);

        let mut result = File::open(path_to_output).unwrap();
        let mut expected = File::open("test_files/progress_traj_expected.txt").unwrap();
        assert!(file_diff::diff_files(&mut result, &mut expected));
    }
}
