mod audio_format;
